use chrono::{DateTime, Local};

const EXAMPLES: &[(&str, &str, &str)] = &[
    (
        "Photoshop cracked installer for Mac",
        "/07_RESOURCES/Software/Mac/Unofficial_Cracked",
        "It's an unofficial Mac app installer; software belongs in the dedicated resources/software folder for clarity and safety.",
    ),
    (
        "Clothing mockup, PSD file",
        "/07_RESOURCES/Mockups/Clothing",
        "Mockups are reusable assets, and 'Clothing' is the dedicated subcategory under mockups for this type.",
    ),
    (
        "Berlin trip photos, 2025",
        "/03_PHOTOS/2025/Berlin_Trip",
        "Photos by year and event name keep memories organized and easy to find chronologically.",
    ),
    (
        "All files for 2025 'BrandX' web design project",
        "/01_PROJECTS/2025/BrandX",
        "Project-specific work is stored in year-based subfolders under Projects.",
    ),
    (
        "Custom coding boilerplate template",
        "/05_CODE/Templates",
        "Generic code templates are best grouped with other reusable code resources in the Templates subfolder.",
    ),
];

/// System prompt asking the model for one folder path plus a short reason,
/// wrapped in `<recommendation>` XML.
pub fn build_prompt(tree: &str, description: &str, now: DateTime<Local>) -> String {
    let mut examples = String::new();
    for (input, path, reason) in EXAMPLES {
        examples.push_str(&format!(
            "<example>\n  <input>Description: {input}</input>\n  <output>\n    <recommendation>\n      <path>{path}</path>\n      <reason>{reason}</reason>\n    </recommendation>\n  </output>\n</example>\n"
        ));
    }

    format!(
        r#"<role>
You are a highly organized archival AI assistant.
Your job is to determine the best folder location for any file, asset, or resource, given a defined folder structure for a creative professional with multiple disciplines.
Current date: {date}
Current time: {time}
</role>

<context>
The user's storage is organized as follows:
{tree}
</context>

<instructions>
Given a file description or name, provide ONLY:
- The recommended full folder path, using the above structure.
- A very brief justification (1-2 sentences) based on the description and structure.

Rules:
- If unsure, prefer universal or resources folders.
- Suggest new subfolders under existing categories if it improves clarity, and include them in the response.
- Never place files in more than one top-level folder.
- If a file relates to a specific project/client/year, recommend inside 01_PROJECTS (with YYYY/ProjectName subfolders).
- If a user input contains a date and/or time, take it into account when recommending a folder path.
- Always output in the XML format below.
</instructions>

<format>
<recommendation>
  <path></path>
  <reason></reason>
</recommendation>
</format>

<examples>
{examples}</examples>

<output_instruction>
Always wrap your single recommended folder path and brief reason with <recommendation>, <path>, and <reason> tags.
</output_instruction>

<input>Description: {description}</input>
"#,
        date = now.format("%Y-%m-%d"),
        time = now.format("%H:%M:%S"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn embeds_date_tree_and_description() {
        let now = Local.with_ymd_and_hms(2025, 3, 14, 9, 5, 0).unwrap();
        let p = build_prompt("├── 01_PROJECTS\n", "invoice for BrandX", now);

        assert!(p.contains("Current date: 2025-03-14"));
        assert!(p.contains("Current time: 09:05:00"));
        assert!(p.contains("organized as follows:\n├── 01_PROJECTS\n"));
        assert!(p.trim_end().ends_with("<input>Description: invoice for BrandX</input>"));
        assert_eq!(p.matches("<example>").count(), EXAMPLES.len());
    }
}
