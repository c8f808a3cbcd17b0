//! Prompt rendering for the correction oracle.

use std::fmt::Write as _;

use crate::domain::errors::OracleError;
use crate::domain::models::{CorrectionParams, Quality, RequestDocument};

/// System prompt for one correction round.
pub fn render_system_prompt(params: &CorrectionParams) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "You proofread text extracted from scanned book pages by OCR. The user sends a JSON \
         document whose `layouts` array lists layout elements in reading order. Each layout has \
         an `id` and a `content` array of lines.\n\n",
    );

    if params.is_footnote {
        prompt.push_str(
            "Every layout in this document is a footnote. Footnotes are short and may start with \
             a reference mark; keep each mark attached to the footnote it introduces.\n\n",
        );
    } else {
        prompt.push_str(
            "The layouts are body text: paragraphs, headlines and similar elements. Sentences \
             often continue from one layout into the next.\n\n",
        );
    }

    prompt.push_str("## Task\n\n");
    let _ = writeln!(
        prompt,
        "1. Find OCR errors: misrecognised characters, broken words, wrong punctuation, \
         stray symbols. Look at no more than {} neighbouring layouts at a time to judge context.",
        params.layouts_count
    );
    prompt.push_str(
        "2. Correct the errors you are confident about. Never rewrite style, translate, \
         summarise or merge layouts.\n",
    );
    prompt.push_str("3. Grade the document as it was before your corrections.\n\n");

    if !params.marks.is_empty() {
        let _ = writeln!(
            prompt,
            "Reference marks such as {} link body text to footnotes. OCR often garbles them \
             into digits or letters; restore them, but never invent new ones.\n",
            params.marks.join(" ")
        );
    }

    prompt.push_str("## Grades\n\n");
    for quality in Quality::ALL {
        let _ = writeln!(prompt, "- `{quality}`: {}", grade_description(quality));
    }

    prompt.push_str(
        "\n## Output\n\n\
         Answer with a single ```json fenced block containing an object with two keys:\n\n\
         - `overview`: `{\"quality\": <grade>, \"remain\": <bool>}` where `remain` tells whether \
         errors are left that you did not correct.\n\
         - `updation`: an array of `{\"id\": <layout id>, \"content\": [<lines>]}` for every \
         layout you changed. Each entry replaces that layout's whole content, so repeat its \
         unchanged lines too and keep line ids. Leave out layouts you did not change and never \
         use an id that is not in the request.\n",
    );

    prompt
}

const fn grade_description(quality: Quality) -> &'static str {
    match quality {
        Quality::Invalid => "the text is garbage or not text at all",
        Quality::Poor => "errors in most sentences",
        Quality::Fair => "noticeable errors in several places",
        Quality::Good => "a few minor errors",
        Quality::Perfect => "no errors left",
    }
}

/// User message carrying the request document.
pub fn render_user_message(request: &RequestDocument) -> Result<String, OracleError> {
    let body = serde_json::to_string_pretty(request)
        .map_err(|e| OracleError::Parse(format!("failed to encode request document: {e}")))?;
    Ok(format!("```json\n{body}\n```"))
}
