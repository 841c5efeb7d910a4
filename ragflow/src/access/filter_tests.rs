//! Tests for access filter construction and evaluation.

#[cfg(test)]
mod tests {
    use crate::access::{build_access_filter, AccessFilter, RoleMapping};
    use crate::chunking::ChunkMetadata;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn set(tags: &[&str]) -> BTreeSet<String> {
        tags.iter().map(|t| (*t).to_string()).collect()
    }

    fn tags(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|t| (*t).to_string()).collect()
    }

    #[test]
    fn test_no_role_no_tags_is_unrestricted() {
        let mapping = RoleMapping::new().with_role("Admin", ["Everything"]);
        assert_eq!(build_access_filter(None, &[], &mapping), None);
        assert_eq!(build_access_filter(Some(""), &tags(&["  "]), &mapping), None);
    }

    #[test]
    fn test_role_only_is_standalone_condition() {
        let filter = build_access_filter(Some("Admin"), &[], &RoleMapping::new());
        assert_eq!(filter, Some(AccessFilter::RoleEquals("Admin".to_string())));
    }

    #[test]
    fn test_tags_only_is_standalone_condition() {
        let filter = build_access_filter(None, &tags(&["Public"]), &RoleMapping::new());
        assert_eq!(filter, Some(AccessFilter::TagsAnyOf(set(&["Public"]))));
    }

    #[test]
    fn test_role_and_mapped_tags_are_or_combined() {
        let mapping = RoleMapping::new().with_role("Finance_Manager", ["Finance"]);
        let filter = build_access_filter(Some("Finance_Manager"), &tags(&["Public"]), &mapping);

        assert_eq!(
            filter,
            Some(AccessFilter::Or(vec![
                AccessFilter::RoleEquals("Finance_Manager".to_string()),
                AccessFilter::TagsAnyOf(set(&["Finance", "Public"])),
            ]))
        );
    }

    #[test]
    fn test_build_is_pure() {
        let mapping = RoleMapping::new().with_role("HR", ["People", "Payroll"]);
        let before = mapping.clone();

        let first = build_access_filter(Some("HR"), &tags(&["Public"]), &mapping);
        let second = build_access_filter(Some("HR"), &tags(&["Public"]), &mapping);

        assert_eq!(first, second);
        assert_eq!(mapping, before);
    }

    #[test]
    fn test_matches_any_of_tags() {
        let filter = AccessFilter::TagsAnyOf(set(&["Finance", "Public"]));

        let mut metadata = ChunkMetadata::new("doc");
        metadata.access_tags = set(&["Public", "Legal"]);
        assert!(filter.matches(&metadata));

        metadata.access_tags = set(&["Legal"]);
        assert!(!filter.matches(&metadata));

        metadata.access_tags.clear();
        assert!(!filter.matches(&metadata));
    }

    #[test]
    fn test_matches_role_or_tags() {
        let filter = AccessFilter::Or(vec![
            AccessFilter::RoleEquals("Admin".to_string()),
            AccessFilter::TagsAnyOf(set(&["Public"])),
        ]);

        let mut strict = ChunkMetadata::new("doc");
        strict.required_role_strict = Some("Admin".to_string());
        assert!(filter.matches(&strict));

        let mut other_role = ChunkMetadata::new("doc");
        other_role.required_role_strict = Some("Intern".to_string());
        assert!(!filter.matches(&other_role));

        other_role.access_tags = set(&["Public"]);
        assert!(filter.matches(&other_role));
    }

    #[test]
    fn test_chroma_where_rendering() {
        let filter = AccessFilter::Or(vec![
            AccessFilter::RoleEquals("Finance_Manager".to_string()),
            AccessFilter::TagsAnyOf(set(&["Public", "Finance"])),
        ]);

        assert_eq!(
            filter.to_chroma_where(),
            serde_json::json!({
                "$or": [
                    {"required_role_strict": {"$eq": "Finance_Manager"}},
                    {"access_tags": {"$in": ["Finance", "Public"]}},
                ]
            })
        );
    }
}
