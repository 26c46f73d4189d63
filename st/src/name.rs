//! Template file names
//!
//! Template files follow `{order}-{menu}-{title}.{extension}.txt`. The order
//! sorts the entry in the "create" menu, `__` in the menu part opens a
//! sub-menu, and the title is the default name of the created script.

use serde::Serialize;

use crate::error::TemplateError;

const MENU_SEPARATOR: &str = "__";

/// Name parts for a new custom template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTemplate {
    pub order: i32,
    pub menu_name: String,
    pub title: String,
    pub extension: String,
}

impl Default for NewTemplate {
    fn default() -> Self {
        Self {
            order: 0,
            menu_name: "Scripting__New Custom Template".to_string(),
            title: "NewCustomScriptTemplate".to_string(),
            extension: "cs".to_string(),
        }
    }
}

impl NewTemplate {
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}-{}.{}{}",
            self.order,
            self.menu_name,
            self.title,
            self.extension,
            crate::TEMPLATE_FILE_EXTENSION
        )
    }
}

/// Parsed view of an existing template file name, for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateName {
    pub order: i32,
    pub menu_path: Vec<String>,
    pub title: Option<String>,
    pub extension: String,
}

impl TemplateName {
    /// Best-effort parse; `None` when the name does not follow the convention
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(crate::TEMPLATE_FILE_EXTENSION)?;
        let (order, rest) = stem.split_once('-')?;
        let order = order.trim().parse().ok()?;

        let (menu, title, extension) = match rest.rsplit_once('-') {
            Some((menu, tail)) => {
                let (title, extension) = tail.split_once('.')?;
                (menu, Some(title.to_string()), extension)
            }
            None => {
                let (menu, extension) = rest.rsplit_once('.')?;
                (menu, None, extension)
            }
        };

        if menu.is_empty() || extension.is_empty() {
            return None;
        }

        Some(Self {
            order,
            menu_path: menu.split(MENU_SEPARATOR).map(str::to_string).collect(),
            title,
            extension: extension.to_string(),
        })
    }

    /// Menu path joined for display, e.g. `Scripting/New Custom Template`
    pub fn menu_display(&self) -> String {
        self.menu_path.join("/")
    }
}

/// Check that a file name can be written into a template directory
pub fn validate_file_name(file_name: &str) -> Result<(), TemplateError> {
    let invalid = |reason: &str| TemplateError::InvalidFileName {
        file_name: file_name.to_string(),
        reason: reason.to_string(),
    };

    if file_name.trim().is_empty() {
        return Err(invalid("name is empty"));
    }
    if file_name.contains('/') || file_name.contains('\\') {
        return Err(invalid("name must not contain path separators"));
    }
    if file_name == "." || file_name == ".." {
        return Err(invalid("name must not be a relative directory"));
    }
    if file_name.contains('\0') {
        return Err(invalid("name must not contain NUL"));
    }
    if !file_name.ends_with(crate::TEMPLATE_FILE_EXTENSION) || file_name == crate::TEMPLATE_FILE_EXTENSION {
        return Err(invalid("name must end with .txt"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_template_default_file_name() {
        let name = NewTemplate::default();
        assert_eq!(
            name.file_name(),
            "0-Scripting__New Custom Template-NewCustomScriptTemplate.cs.txt"
        );
    }

    #[test]
    fn test_parse_built_in_name() {
        let name = TemplateName::parse("81-C# Script-NewBehaviourScript.cs.txt").unwrap();
        assert_eq!(name.order, 81);
        assert_eq!(name.menu_path, vec!["C# Script"]);
        assert_eq!(name.title.as_deref(), Some("NewBehaviourScript"));
        assert_eq!(name.extension, "cs");
    }

    #[test]
    fn test_parse_submenu_without_title() {
        let name = TemplateName::parse("99-Tools__MyTemplate.cs.txt").unwrap();
        assert_eq!(name.order, 99);
        assert_eq!(name.menu_display(), "Tools/MyTemplate");
        assert_eq!(name.title, None);
    }

    #[test]
    fn test_parse_roundtrips_new_template() {
        let new = NewTemplate {
            order: 5,
            menu_name: "Tools__Editor".to_string(),
            title: "MyWindow".to_string(),
            extension: "cs".to_string(),
        };
        let name = TemplateName::parse(&new.file_name()).unwrap();
        assert_eq!(name.menu_path, vec!["Tools", "Editor"]);
        assert_eq!(name.title.as_deref(), Some("MyWindow"));
    }

    #[test]
    fn test_parse_rejects_unconventional_names() {
        assert_eq!(TemplateName::parse("readme.md"), None);
        assert_eq!(TemplateName::parse("notes.txt"), None);
        assert_eq!(TemplateName::parse("x-Menu-Title.cs.txt"), None);
    }

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("99-Tools__MyTemplate.cs.txt").is_ok());
        assert!(validate_file_name("").is_err());
        assert!(validate_file_name("   ").is_err());
        assert!(validate_file_name("../escape.txt").is_err());
        assert!(validate_file_name("sub\\a.txt").is_err());
        assert!(validate_file_name("a.cs").is_err());
        assert!(validate_file_name(".txt").is_err());
    }
}
