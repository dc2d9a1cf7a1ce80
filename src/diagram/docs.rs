//! Formatting of XML documentation comments for display in the viewer

use crate::diagram::model::XmlDocs;
use crate::error::{Error, Result};
use crate::metadata::DocumentationProvider;
use regex::Regex;

const LINE_PADDING: &str = r"^[ \t]+|[ \t]+$";

/// `see cref="T:`, `see href="`, `paramref name="` and the closing `" /` of those tags
const REFERENCE_ATTRIBUTES: &str = r#"(see\s.ref="(.:)?)|(paramref\sname=")|("\s/)"#;

/// Turns raw documentation comments into compact plain text
pub struct DocFormatter<'a> {
    provider: &'a dyn DocumentationProvider,
    noise: Regex,
    whitespace: Regex,
}

impl<'a> DocFormatter<'a> {
    /// `strip_namespaces` are removed from the text in the given order, so list
    /// `System.Collections` before `System` to remove both completely.
    pub fn new(provider: &'a dyn DocumentationProvider, strip_namespaces: &[String]) -> Result<Self> {
        let mut alternatives = vec![LINE_PADDING.to_string(), REFERENCE_ATTRIBUTES.to_string()];
        alternatives.extend(
            strip_namespaces
                .iter()
                .filter(|ns| !ns.is_empty())
                .map(|ns| format!(r"({}\.)", regex::escape(ns))),
        );

        let pattern = format!("(?m){}", alternatives.join("|"));
        let noise = Regex::new(&pattern).map_err(|e| Error::pattern(pattern.clone(), e))?;
        let whitespace = Regex::new(r"[ \t]+").map_err(|e| Error::pattern(r"[ \t]+", e))?;

        Ok(Self {
            provider,
            noise,
            whitespace,
        })
    }

    /// The formatted documentation of an entity, if it has any
    pub fn format(&self, doc_id: &str) -> Option<String> {
        let raw = self.provider.documentation(doc_id)?;

        let comment = raw
            .replace("<summary>", "")
            .replace("</summary>", "")
            .replace("<para>", "\n")
            .replace("</para>", "\n");
        let comment = comment.trim().replace('<', "[").replace('>', "]");

        let comment = self.noise.replace_all(&comment, "");
        let comment = self.whitespace.replace_all(&comment, " ");
        let comment = decode_entities(&comment);

        if comment.is_empty() {
            None
        } else {
            Some(comment)
        }
    }

    /// Collect the documentation of a type and its members.
    ///
    /// `entries` pairs a member name (empty for the type itself) with its
    /// documentation id. Later entries replace earlier ones of the same name.
    pub fn collect<'e>(&self, entries: impl IntoIterator<Item = (&'e str, &'e str)>) -> Option<XmlDocs> {
        let mut docs = XmlDocs::new();
        for (name, doc_id) in entries {
            if let Some(doc) = self.format(doc_id) {
                docs.insert(name.to_string(), doc);
            }
        }

        if docs.is_empty() {
            None
        } else {
            Some(docs)
        }
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn provider(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_summary_is_unwrapped_and_trimmed() {
        let docs = provider(&[(
            "T:MyApp.Customer",
            "\n            <summary>A paying   customer.</summary>\n        ",
        )]);
        let formatter = DocFormatter::new(&docs, &[]).unwrap();
        assert_eq!(formatter.format("T:MyApp.Customer").as_deref(), Some("A paying customer."));
    }

    #[test]
    fn test_paragraphs_and_references() {
        let docs = provider(&[(
            "P:MyApp.Customer.Orders",
            "<summary>\n    Orders placed by this customer.\n    <para>See <see cref=\"T:MyApp.Models.Order\" /> for details.</para>\n    </summary>",
        )]);
        let namespaces = vec!["MyApp.Models".to_string(), "MyApp".to_string()];
        let formatter = DocFormatter::new(&docs, &namespaces).unwrap();

        assert_eq!(
            formatter.format("P:MyApp.Customer.Orders").as_deref(),
            Some("Orders placed by this customer.\n\nSee [Order] for details.")
        );
    }

    #[test]
    fn test_entities_are_decoded() {
        let docs = provider(&[("F:MyApp.Flags.Both", "<summary>Read &amp; write</summary>")]);
        let formatter = DocFormatter::new(&docs, &[]).unwrap();
        assert_eq!(formatter.format("F:MyApp.Flags.Both").as_deref(), Some("Read & write"));
    }

    #[test]
    fn test_empty_docs_are_dropped() {
        let docs = provider(&[("T:MyApp.Empty", "<summary>   </summary>")]);
        let formatter = DocFormatter::new(&docs, &[]).unwrap();

        assert!(formatter.format("T:MyApp.Empty").is_none());
        assert!(formatter.collect([("", "T:MyApp.Empty"), ("Name", "P:MyApp.Missing")]).is_none());
    }

    #[test]
    fn test_collect_keys_by_member_name() {
        let docs = provider(&[
            ("T:MyApp.Customer", "<summary>Customer</summary>"),
            ("P:MyApp.Person.Name", "<summary>Base name</summary>"),
            ("P:MyApp.Customer.Name", "<summary>Display name</summary>"),
        ]);
        let formatter = DocFormatter::new(&docs, &[]).unwrap();

        let collected = formatter
            .collect([
                ("", "T:MyApp.Customer"),
                ("Name", "P:MyApp.Person.Name"),
                ("Name", "P:MyApp.Customer.Name"),
            ])
            .unwrap();
        assert_eq!(collected.len(), 2);
        assert_eq!(collected[""], "Customer");
        assert_eq!(collected["Name"], "Display name");
    }
}
