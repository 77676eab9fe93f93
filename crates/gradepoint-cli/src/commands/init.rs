//! The `gradepoint init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create gradepoint.toml
    if std::path::Path::new("gradepoint.toml").exists() {
        println!("gradepoint.toml already exists, skipping.");
    } else {
        std::fs::write("gradepoint.toml", SAMPLE_CONFIG)?;
        println!("Created gradepoint.toml");
    }

    // Create example transcript
    std::fs::create_dir_all("transcripts")?;
    let example_path = std::path::Path::new("transcripts/example.json");
    if example_path.exists() {
        println!("transcripts/example.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_TRANSCRIPT)?;
        println!("Created transcripts/example.json");
    }

    println!("\nNext steps:");
    println!("  1. Edit transcripts/example.json or run: gradepoint import --csv <export.csv> --out transcripts/mine.json");
    println!("  2. Run: gradepoint validate --transcript transcripts/example.json");
    println!("  3. Run: gradepoint calc --transcript transcripts/example.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# gradepoint configuration

# Where `calc --format json,html` writes reports.
output_dir = "./gradepoint-results"

# text, markdown, json, html, or all (comma-separated)
default_format = "text"

# Course names that satisfy the same requirement in every transcript.
# [[equivalences]]
# course_a = "MATH 101"
# course_b = "MATH 101H"
"#;

const EXAMPLE_TRANSCRIPT: &str = r#"{
  "name": "Example Student",
  "terms": [
    {
      "index": 1,
      "name": "2023 Fall Semester",
      "rows": [
        { "id": "1", "name": "MATH 101", "units": 3, "grade": "D" },
        { "id": "2", "name": "ENGL 101", "units": 3, "grade": "B+" },
        { "id": "3", "name": "CHEM 110", "units": 4, "grade": "W" }
      ]
    },
    {
      "index": 2,
      "name": "2024 Spring Semester",
      "rows": [
        { "id": "4", "name": "MATH 101", "units": 3, "grade": "A-" },
        { "id": "5", "name": "CHEM 110", "units": 4, "grade": "B" },
        { "id": "6", "name": "ENGL 102H", "units": 3, "grade": "A" }
      ]
    }
  ],
  "equivalences": [],
  "transfers": [{ "id": 1, "school": "CITY COLLEGE", "credits": 6 }],
  "next_row_id": 7
}
"#;
