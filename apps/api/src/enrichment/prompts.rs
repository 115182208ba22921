// All LLM prompt constants for the Enrichment Gateway.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Summary prompt. Replace `{author_voice}`, `{content}`.
pub const SUMMARIZE_PROMPT_TEMPLATE: &str = r#"{author_voice}

Summarize the blog post below in about 50 words. Make it engaging so a reader
wants to click through, and do not start with "This post".

Return a JSON object with this EXACT schema:
{"summary": "..."}

POST:
{content}"#;

/// Tag extraction prompt. Replace `{content}`.
pub const EXTRACT_TAGS_PROMPT_TEMPLATE: &str = r#"Extract between 3 and 5 short topical tags
(technologies, techniques or themes) from the content below. Use Title Case for
words and the canonical spelling for technologies (e.g. "PostgreSQL", "dbt").

Return a JSON object with this EXACT schema:
{"tags": ["Tag One", "Tag Two", "Tag Three"]}

CONTENT:
{content}"#;

/// Long-form generation prompt. Replace `{author_voice}`, `{title}`, `{tags}`.
pub const GENERATE_CONTENT_PROMPT_TEMPLATE: &str = r#"{author_voice}

Write a complete blog post titled "{title}" covering these topics: {tags}.

Requirements:
1. At least 500 words of markdown
2. Use ## and ### headings to structure the post
3. Include at least one bulleted or numbered list
4. Include at least one fenced code block with a language tag
5. Do NOT repeat the title as a top-level heading

Return a JSON object with this EXACT schema:
{"content": "<the markdown post>"}"#;

/// Image prompt. Replace `{topic}`.
pub const GENERATE_IMAGE_PROMPT_TEMPLATE: &str = "Create a clean, modern, abstract \
    illustration suitable as a blog header image for the topic: {topic}. \
    No text, no logos, wide 16:9 composition.";

/// Related-posts prompt. Replace `{title}`, `{content}`, `{candidates_json}`.
pub const FIND_RELATED_PROMPT_TEMPLATE: &str = r#"A reader just finished the post below.
Pick the 2 or 3 candidate posts they are most likely to enjoy next, based on
shared topics and natural follow-up reading.

CURRENT POST TITLE: {title}
CURRENT POST CONTENT:
{content}

CANDIDATES (choose ONLY from these slugs):
{candidates_json}

Return a JSON object with this EXACT schema:
{"relatedSlugs": ["candidate-slug-one", "candidate-slug-two"]}"#;

/// System instruction for the portfolio chat assistant.
pub const CONVERSE_SYSTEM: &str = "You are the assistant on a data engineer's \
    portfolio site. Answer questions about their experience, projects and skills \
    in a friendly, concise way. When a question is about whether they suit a \
    role or a set of skills, call the scoreSuitability tool with the skills the \
    role requires, then explain the score, the matched skills and the gaps in \
    plain language. Never invent experience that is not in the tool results.";
