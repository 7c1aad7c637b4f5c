// ============================================================
// Layer 5 — Tokenizer Loading
// ============================================================
// Builds a tokenizers::Tokenizer from whatever the model ships:
//   - tokenizer.json → loaded as-is
//   - vocab.txt      → a BERT WordPiece pipeline is assembled:
//                      BertNormalizer → BertPreTokenizer →
//                      WordPiece → [CLS] A [SEP] B [SEP]
//
// Padding is always disabled: sequences are run one at a time.

use anyhow::{anyhow, Result};
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::normalizers::bert::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::processors::bert::BertProcessing;
use tokenizers::Tokenizer;

use crate::infra::hub::TokenizerFile;

/// Load a tokenizer; `lowercase` only applies to WordPiece vocabularies.
pub fn load_tokenizer(file: &TokenizerFile, lowercase: bool) -> Result<Tokenizer> {
    let mut tokenizer = match file {
        TokenizerFile::Json(path) => Tokenizer::from_file(path)
            .map_err(|e| anyhow!("Cannot load tokenizer from '{}': {e}", path.display()))?,

        TokenizerFile::WordPieceVocab(path) => {
            let vocab = path
                .to_str()
                .ok_or_else(|| anyhow!("Non UTF-8 vocab path '{}'", path.display()))?;
            let wordpiece = WordPiece::from_file(vocab)
                .unk_token("[UNK]".to_string())
                .build()
                .map_err(|e| anyhow!("Cannot load WordPiece vocab '{vocab}': {e}"))?;

            let mut tokenizer = Tokenizer::new(wordpiece);
            tokenizer.with_normalizer(Some(BertNormalizer::new(true, true, None, lowercase)));
            tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));

            let special = |t: &str| {
                tokenizer
                    .token_to_id(t)
                    .ok_or_else(|| anyhow!("Vocab '{vocab}' has no {t} token"))
            };
            let cls = special("[CLS]")?;
            let sep = special("[SEP]")?;
            tokenizer.with_post_processor(Some(BertProcessing::new(
                ("[SEP]".to_string(), sep),
                ("[CLS]".to_string(), cls),
            )));
            tokenizer
        }
    };

    tokenizer.with_padding(None);
    Ok(tokenizer)
}
