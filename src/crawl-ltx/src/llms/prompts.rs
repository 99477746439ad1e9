use std::collections::HashMap;

use indoc::indoc;
use subst::substitute;

use crate::llms::LlmError;

/// Only the start of a page is sent: enough to summarize, bounded in tokens.
pub const MAX_CONTENT_CHARS: usize = 8_000;

const SUMMARIZE_PAGE: &str = indoc! { r#"
  You are writing one entry of an llms.txt file: a concise index of a website meant for large language models.

  Summarize the web page below with:
  - a title of 3-4 words
  - a description of 9-10 words

  The page was fetched from ${URL} and converted to markdown (_note the XML-like tags delineate the content_):
  <page>
  ${CONTENT}
  </page>

  Respond with only a JSON object in exactly this shape and nothing else:
  {"title": "<3-4 word title>", "description": "<9-10 word description>"}
"#};

pub fn prompt_summarize_page(url: &str, markdown: &str) -> Result<String, LlmError> {
    let res = substitute(SUMMARIZE_PAGE, &{
        let mut v = HashMap::new();
        v.insert("URL".to_string(), url.to_string());
        v.insert("CONTENT".to_string(), truncate_chars(markdown, MAX_CONTENT_CHARS).to_string());
        v
    })?;
    Ok(res)
}

/// The longest prefix of `text` with at most `max` characters.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
