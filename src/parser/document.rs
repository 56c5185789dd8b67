//! Document splitting and parsing.
//!
//! Files can contain multiple map definitions, each starting with `---`
//! followed by YAML frontmatter containing at least `name:`.

use crate::error::{GridwayError, Result};

use super::body::extract_body;
use super::frontmatter::extract_frontmatter;
use super::legend::extract_legend;
use super::span::{Span, Spanned};
use super::types::RawDocument;

/// Parse a file containing one or more map definitions.
///
/// Each definition starts with `---` and YAML frontmatter containing `name:`.
pub fn parse_documents(source: &str) -> Result<Vec<RawDocument>> {
    let sections = split_documents(source);

    let mut documents = Vec::new();

    for (section, base_offset) in sections {
        let doc = parse_single_document(&section, base_offset)?;
        documents.push(doc);
    }

    if documents.is_empty() {
        return Err(GridwayError::Parse {
            message: "No documents found in file".to_string(),
            help: Some("Add a document with ---\\nname: my-map\\n---".to_string()),
        });
    }

    Ok(documents)
}

/// Split source into document sections.
///
/// Returns (section_content, base_offset) for each document.
fn split_documents(source: &str) -> Vec<(String, usize)> {
    let mut sections = Vec::new();
    let mut current_start = 0;
    let mut in_code_block = false;

    let lines: Vec<&str> = source.lines().collect();
    let mut offset = 0;

    for (i, line) in lines.iter().enumerate() {
        // Track code blocks to avoid splitting inside them
        if line.trim().starts_with("```") {
            in_code_block = !in_code_block;
        }

        // Look for document boundary: --- followed by name:
        if !in_code_block && line.trim() == "---" && i > 0 {
            if let Some(next_line) = lines.get(i + 1) {
                if next_line.trim().starts_with("name:") {
                    let section = &source[current_start..offset];
                    if !section.trim().is_empty() {
                        sections.push((section.to_string(), current_start));
                    }
                    current_start = offset;
                }
            }
        }

        offset += line.len() + 1; // +1 for newline
    }

    // Add final section
    let final_section = &source[current_start..];
    if !final_section.trim().is_empty() {
        sections.push((final_section.to_string(), current_start));
    }

    // If no sections found, treat entire file as one document
    if sections.is_empty() && !source.trim().is_empty() {
        sections.push((source.to_string(), 0));
    }

    sections
}

/// Parse a single document section.
fn parse_single_document(source: &str, base_offset: usize) -> Result<RawDocument> {
    // Extract frontmatter
    let frontmatter_result = extract_frontmatter(source, base_offset)?;

    // Get name from frontmatter (required)
    let name = frontmatter_result
        .values
        .get("name")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| GridwayError::Parse {
            message: "Document missing required 'name' field".to_string(),
            help: Some("Add name: my-map to frontmatter".to_string()),
        })?;

    let name_span = frontmatter_result.span;

    // Extract map body (optional at this stage; map construction requires it)
    let remaining = &source[frontmatter_result.content_start..];
    let remaining_offset = base_offset + frontmatter_result.content_start;

    let (body, legend_source_start) = match extract_body(remaining, remaining_offset) {
        Some(body_result) => (
            Some(body_result.content),
            frontmatter_result.content_start + body_result.content_end,
        ),
        None => (None, frontmatter_result.content_start),
    };

    // Extract legend (optional)
    let legend_source = &source[legend_source_start..];
    let legend_offset = base_offset + legend_source_start;

    let legend = extract_legend(legend_source, legend_offset)?.map(|result| result.entries);

    let doc_span = Span::from_local_offsets(source, 0, source.len(), base_offset);

    Ok(RawDocument {
        name: Spanned::new(name, name_span),
        frontmatter: frontmatter_result.values,
        body,
        legend,
        span: doc_span,
    })
}
