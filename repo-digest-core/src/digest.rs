//! Digest assembly: concatenates reduced sections in enumeration order.

use std::fmt;

use serde::Serialize;

use crate::config::DigestFormat;
use crate::contract::{ReductionResult, ReductionTier, RepositoryEntry};
use crate::language::{Dialect, LanguageFamily};

/// What happened to one file on its way into the digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSummary {
    pub virtual_path: String,
    pub family: LanguageFamily,
    pub tier: ReductionTier,
    pub input_bytes: usize,
    pub output_bytes: usize,
}

/// The finished digest text plus one summary per section, in output order.
#[derive(Debug, Clone, Default)]
pub struct Digest {
    pub text: String,
    pub sections: Vec<SectionSummary>,
}

impl Digest {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Sections whose structural parse failed.
    pub fn fallbacks(&self) -> impl Iterator<Item = &SectionSummary> {
        self.sections
            .iter()
            .filter(|s| s.family != LanguageFamily::Other && s.tier != ReductionTier::Structural)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Builds a [`Digest`] one section at a time.
#[derive(Debug)]
pub struct DigestAssembler {
    format: DigestFormat,
    sections: Vec<String>,
    summaries: Vec<SectionSummary>,
}

impl DigestAssembler {
    pub fn new(format: DigestFormat) -> Self {
        Self {
            format,
            sections: Vec::new(),
            summaries: Vec::new(),
        }
    }

    pub fn format(&self) -> DigestFormat {
        self.format
    }

    /// Append `<marker> File: <path>\n<reduced text>\n\n`.
    ///
    /// The marker is `#` for Python, `//` for the JavaScript and C families
    /// and empty otherwise, so unknown files get a header of ` File: <path>`.
    pub fn push_reduced(&mut self, entry: &RepositoryEntry, result: &ReductionResult) {
        let family = entry.family();
        let section = format!(
            "{} File: {}\n{}\n\n",
            family.comment_marker(),
            entry.virtual_path,
            result.text
        );
        self.record(entry, family, result.tier, section);
    }

    /// Append the unreduced file inside a fenced markdown block.
    pub fn push_markdown(&mut self, entry: &RepositoryEntry) {
        let family = entry.family();
        let fence = Dialect::from_path(&entry.virtual_path).fence_tag();
        let section = format!(
            "## {}\n\n```{}\n{}\n```\n\n",
            entry.virtual_path,
            fence,
            entry.text()
        );
        self.record(entry, family, ReductionTier::Raw, section);
    }

    fn record(
        &mut self,
        entry: &RepositoryEntry,
        family: LanguageFamily,
        tier: ReductionTier,
        section: String,
    ) {
        self.summaries.push(SectionSummary {
            virtual_path: entry.virtual_path.clone(),
            family,
            tier,
            input_bytes: entry.content.len(),
            output_bytes: section.len(),
        });
        self.sections.push(section);
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn finish(self) -> Digest {
        let separator = match self.format {
            DigestFormat::Annotated => "",
            DigestFormat::Markdown => "\n",
        };
        Digest {
            text: self.sections.join(separator),
            sections: self.summaries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, content: &str) -> RepositoryEntry {
        RepositoryEntry::new(path, content.as_bytes().to_vec())
    }

    #[test]
    fn annotated_sections_use_the_family_marker() {
        let mut assembler = DigestAssembler::new(DigestFormat::Annotated);
        assembler.push_reduced(
            &entry("a.py", "import os"),
            &ReductionResult::structural("import os".into()),
        );
        assembler.push_reduced(
            &entry("b.ts", "let x = 1;"),
            &ReductionResult::structural("let x = 1;".into()),
        );
        assembler.push_reduced(&entry("c.md", "# hi"), &ReductionResult::raw("# hi".into()));
        let digest = assembler.finish();

        assert_eq!(
            digest.text,
            "# File: a.py\nimport os\n\n// File: b.ts\nlet x = 1;\n\n File: c.md\n# hi\n\n"
        );
        assert_eq!(digest.sections.len(), 3);
        assert_eq!(digest.fallbacks().count(), 0);
    }

    #[test]
    fn empty_assembler_yields_empty_digest() {
        let digest = DigestAssembler::new(DigestFormat::Annotated).finish();
        assert!(digest.is_empty());
        assert_eq!(digest.as_str(), "");
    }

    #[test]
    fn markdown_sections_are_fenced() {
        let mut assembler = DigestAssembler::new(DigestFormat::Markdown);
        assembler.push_markdown(&entry("src/app.py", "x = 1\n"));
        assembler.push_markdown(&entry("web/App.tsx", "let a = 1;"));
        let digest = assembler.finish();
        assert_eq!(
            digest.text,
            "## src/app.py\n\n```python\nx = 1\n\n```\n\n\n## web/App.tsx\n\n```tsx\nlet a = 1;\n```\n\n"
        );
    }

    #[test]
    fn summaries_report_sizes_and_tiers() {
        let mut assembler = DigestAssembler::new(DigestFormat::Annotated);
        let e = entry("m.c", "int x");
        assembler.push_reduced(&e, &ReductionResult::raw("int x".into()));
        let digest = assembler.finish();
        let summary = &digest.sections[0];
        assert_eq!(summary.input_bytes, 5);
        assert_eq!(summary.output_bytes, "// File: m.c\nint x\n\n".len());
        assert_eq!(summary.tier, ReductionTier::Raw);
        assert_eq!(digest.fallbacks().count(), 1);
    }
}
