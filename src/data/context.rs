// ============================================================
// Layer 4 — Context Selection
// ============================================================
// Picks the slice of a document's extracted text that is sent to
// the model together with a question.
//
//   Full          → the whole text
//   FirstBlock    → the first "\n\n"-separated block
//   LabeledBlocks → every block containing "Table", each followed
//                   by a blank line
//
// For the data dictionary, FirstBlock is the name of the first
// described table, and LabeledBlocks is the list of all table
// names without their field rows.

use crate::domain::benchmark::ContextScope;
use crate::domain::document::Document;

const TABLE_LABEL: &str = "Table";

/// Build the context text for one question.
pub fn select_context(doc: &Document, scope: ContextScope) -> String {
    match scope {
        ContextScope::Full => doc.text.clone(),

        ContextScope::FirstBlock => doc.blocks().next().unwrap_or_default().to_string(),

        ContextScope::LabeledBlocks => {
            let mut out = String::new();
            for block in doc.blocks().filter(|b| b.contains(TABLE_LABEL)) {
                out.push_str(block);
                out.push_str("\n\n");
            }
            out
        }
    }
}
