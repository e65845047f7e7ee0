//! Column layout of the import spreadsheet

/// How a column's cell turns into Jira fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Row id used for parent references; never sent
    LocalId,
    /// Parent row id; never sent
    ParentId,
    /// Issue type name, looked up in the layout's issue types
    IssueType,
    /// Plain string field
    Text(&'static str),
    /// `dd/mm/yyyy` or ISO date
    Date(&'static str),
    /// Hours, sent as the original estimate
    Estimate,
    /// Single select `{"value": ..}`
    Select(&'static str),
    /// `Parent -> Child` cascading select
    CascadingSelect(&'static str),
    /// Integer; anything else is dropped
    Integer(&'static str),
    /// Comma separated multiselect; not allowed on epics
    MultiSelectList(&'static str),
    /// One multiselect value per column; not allowed on epics
    MultiSelectItem(&'static str),
    /// Appended to the labels array
    Label,
}

/// Column index to field, columns A..X
pub const COLUMNS: [ColumnKind; 24] = [
    ColumnKind::LocalId,                              // A - id
    ColumnKind::ParentId,                             // B - parent
    ColumnKind::IssueType,                            // C - issue type
    ColumnKind::CascadingSelect("customfield_11432"), // D - portfolio
    ColumnKind::Text("summary"),                      // E - summary
    ColumnKind::Date("customfield_10015"),            // F - start date
    ColumnKind::Date("duedate"),                      // G - due date
    ColumnKind::Estimate,                             // H - original estimate
    ColumnKind::Select("customfield_11630"),          // I - role profile
    ColumnKind::Integer("customfield_10034"),         // J - story points
    ColumnKind::Text("customfield_10109"),            // K - minutes / screens / pages
    ColumnKind::MultiSelectList("customfield_11436"), // L - tools and AI
    ColumnKind::MultiSelectItem("customfield_11435"), // M - accessibility
    ColumnKind::MultiSelectItem("customfield_11435"), // N - accessibility
    ColumnKind::MultiSelectItem("customfield_11435"), // O - accessibility
    ColumnKind::MultiSelectItem("customfield_11435"), // P - accessibility
    ColumnKind::Select("customfield_11597"),          // Q - outsourced?
    ColumnKind::Text("customfield_10305"),            // R - contractor
    ColumnKind::Select("customfield_10641"),          // S - casting category
    ColumnKind::Text("customfield_10107"),            // T - project name
    ColumnKind::Select("customfield_10108"),          // U - client / project / cost center
    ColumnKind::Select("customfield_10105"),          // V - development team
    ColumnKind::Select("customfield_11437"),          // W - language
    ColumnKind::Label,                                // X - labels
];

/// Issue type name and its Jira id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueType {
    pub name: String,
    pub id: String,
}

impl IssueType {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// Project-specific settings the mapper needs
#[derive(Debug, Clone)]
pub struct FieldLayout {
    pub project_id: String,
    pub issue_types: Vec<IssueType>,
    /// Issue type id whose issues may not carry multiselect values
    pub epic_type_id: String,
}

impl Default for FieldLayout {
    fn default() -> Self {
        Self {
            project_id: "10879".to_string(),
            issue_types: default_issue_types(),
            epic_type_id: "10000".to_string(),
        }
    }
}

impl FieldLayout {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Self::default()
        }
    }

    /// Look up an issue type id by name (surrounding whitespace ignored)
    pub fn issue_type_id(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.issue_types
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.id.as_str())
    }

    pub fn issue_type_names(&self) -> Vec<String> {
        self.issue_types.iter().map(|t| t.name.clone()).collect()
    }

    pub fn is_epic(&self, issue_type_id: &str) -> bool {
        issue_type_id == self.epic_type_id
    }
}

pub fn default_issue_types() -> Vec<IssueType> {
    vec![
        IssueType::new("Epic", "10000"),
        IssueType::new("História", "10107"),
        IssueType::new("Tarefa", "10164"),
        IssueType::new("Subtarefa", "10109"),
        IssueType::new("Bug", "10103"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_type_lookup_trims() {
        let layout = FieldLayout::default();
        assert_eq!(layout.issue_type_id(" Tarefa "), Some("10164"));
        assert_eq!(layout.issue_type_id("Story"), None);
    }

    #[test]
    fn test_epic_detection_uses_configured_id() {
        let mut layout = FieldLayout::new("1");
        assert!(layout.is_epic("10000"));
        layout.epic_type_id = "42".to_string();
        assert!(!layout.is_epic("10000"));
        assert!(layout.is_epic("42"));
    }
}
