//! Console and JSON presentation of match results

use crate::config::OutputFormat;
use crate::error::Result;
use crate::processing::matcher::{MatchResult, SkillListing};
use colored::{Color, Colorize};
use std::path::Path;

pub trait OutputFormatter {
    fn format_result(&self, result: &MatchResult) -> Result<String>;

    fn format_skills(&self, listing: &SkillListing) -> Result<String>;
}

/// Human-readable report with optional colors
pub struct ConsoleFormatter {
    use_colors: bool,
}

/// Machine-readable output; byte-identical for identical results
pub struct JsonFormatter {
    pretty: bool,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let (prefix, color) = match level {
            1 => ("█", Color::Blue),
            2 => ("▓", Color::Green),
            _ => ("▒", Color::Yellow),
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, percent: u32) -> String {
        let (badge, color) = match percent {
            85..=100 => ("STRONG MATCH", Color::Green),
            70..=84 => ("GOOD MATCH", Color::BrightGreen),
            55..=69 => ("PARTIAL MATCH", Color::Yellow),
            _ => ("WEAK MATCH", Color::Red),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_skill_list(&self, skills: &[String], marker: &str, color: Color) -> String {
        if skills.is_empty() {
            return "  (none)\n".to_string();
        }
        skills
            .iter()
            .map(|skill| format!("  {} {}\n", marker, self.colorize(skill, color)))
            .collect()
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_result(&self, result: &MatchResult) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("CV MATCH REPORT", 1));

        let percent = (result.match_score * 100.0).round() as u32;
        output.push_str(&format!(
            "Match score: {:.2} ({}%) {}\n",
            result.match_score,
            percent,
            self.format_score_badge(percent)
        ));

        let required = result.matched_skills.len() + result.missing_skills.len();
        if required > 0 {
            output.push_str(&format!(
                "Required skills covered: {}/{}\n",
                result.matched_skills.len(),
                required
            ));
        } else {
            output.push_str(&self.colorize(
                "No known skills found in the job description\n",
                Color::Yellow,
            ));
        }

        output.push_str(&self.format_header("Matched skills", 2));
        output.push_str(&self.format_skill_list(&result.matched_skills, "✓", Color::Green));

        output.push_str(&self.format_header("Missing skills", 2));
        output.push_str(&self.format_skill_list(&result.missing_skills, "✗", Color::Red));

        Ok(output)
    }

    fn format_skills(&self, listing: &SkillListing) -> Result<String> {
        let mut output = self.format_header(&format!("KNOWN SKILLS ({})", listing.total), 1);
        for chunk in listing.skills.chunks(6) {
            output.push_str(&format!("  {}\n", chunk.join(", ")));
        }
        Ok(output)
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn to_json<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_result(&self, result: &MatchResult) -> Result<String> {
        self.to_json(result)
    }

    fn format_skills(&self, listing: &SkillListing) -> Result<String> {
        self.to_json(&serde_json::json!({
            "total_skills": listing.total,
            "skills": listing.skills,
        }))
    }
}

pub fn formatter_for(format: OutputFormat, use_colors: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Console => Box::new(ConsoleFormatter::new(use_colors)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: OutputFormat, cv_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(cv_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "cv".to_string());

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("{}_match{}.txt", base_name, timestamp_suffix),
        OutputFormat::Json => format!("{}_match{}.json", base_name, timestamp_suffix),
    }
}
