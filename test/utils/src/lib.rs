/// A successful generateContent body carrying a single candidate with reply
/// text, the happy path of the completion cycle.
pub fn completion_body_fixture() -> &'static str {
    return r#"
{
    "candidates": [
        {
            "content": {
                "role": "model",
                "parts": [{ "text": "Hi there" }]
            },
            "finishReason": "STOP",
            "index": 0
        }
    ]
}
"#
    .trim();
}

/// A generateContent body whose candidate was withheld for safety reasons,
/// no parts, only a finish reason.
pub fn blocked_body_fixture() -> &'static str {
    return r#"
{
    "candidates": [
        {
            "finishReason": "SAFETY",
            "index": 0
        }
    ]
}
"#
    .trim();
}
