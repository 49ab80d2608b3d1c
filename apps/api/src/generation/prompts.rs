// Prompt constants for palette generation.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

/// Palette generation instruction. Replace `{prompt}` and `{json_only}` before sending.
pub const PALETTE_PROMPT_TEMPLATE: &str = r##"You are an expert in colour theory and brand design.
Generate a palette of 5 colours based on what you see or what is asked: "{prompt}".
{json_only}
Structure:
{
  "name": "Creative name",
  "colors": [
    { "hex": "#HEX", "name": "Colour name", "psychology": "Short note" }
  ],
  "typography_suggestion": { "heading": "Font", "body": "Font" },
  "vibe": "Emotion"
}"##;

/// Builds the full generation instruction for a user prompt.
pub fn palette_instruction(prompt: &str) -> String {
    PALETTE_PROMPT_TEMPLATE
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{prompt}", prompt)
}
