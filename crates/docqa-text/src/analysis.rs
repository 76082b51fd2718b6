use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer, TokenStream};

use docqa_core::config::Tokenization;

const STOP_WORDS: [&str; 67] = [
	"a","an","and","are","as","at","be","by","for","from","has","he","in","is","it","its","of","on","that","the","to","was","will","with","or","but","not","this","these","they","them","their","there","then","than","so","if","when","where","why","how","what","which","who","whom","whose","can","could","should","would","may","might","must","shall","do","does","did","have","had","having","i","me","my","we","our","you","your",
];

/// Cuts chunk and query text into BM25 terms. Both sides of a lexical index
/// must go through the same instance.
#[derive(Clone)]
pub struct TermTokenizer {
	tokenization: Tokenization,
	analyzer: Option<TextAnalyzer>,
}

impl TermTokenizer {
	pub fn new(tokenization: Tokenization) -> Self {
		let analyzer = match tokenization {
			Tokenization::Whitespace => None,
			Tokenization::Analyzed => Some(
				TextAnalyzer::builder(SimpleTokenizer::default())
					.filter(LowerCaser)
					.filter(StopWordFilter::remove(STOP_WORDS.iter().map(|s| s.to_string())))
					.build(),
			),
		};
		Self { tokenization, analyzer }
	}

	pub fn tokenization(&self) -> Tokenization { self.tokenization }

	pub fn tokenize(&self, text: &str) -> Vec<String> {
		match &self.analyzer {
			None => text.split_whitespace().map(str::to_string).collect(),
			Some(analyzer) => {
				// token_stream needs &mut; analyzers are cheap to clone
				let mut analyzer = analyzer.clone();
				let mut stream = analyzer.token_stream(text);
				let mut terms = Vec::new();
				while stream.advance() { terms.push(stream.token().text.clone()); }
				terms
			}
		}
	}
}

impl std::fmt::Debug for TermTokenizer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TermTokenizer").field("tokenization", &self.tokenization).finish()
	}
}
