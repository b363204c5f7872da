//! User-selection form fields.
//!
//! These builders produce autocomplete choice fields whose options are the
//! users of a [`UserDirectory`]. The organization form uses the multiple
//! variant for its member selection.

use tally_rs_core::TallyResult;
use tally_rs_forms::fields::{coerce_int, FormFieldDef, FormFieldType};
use tally_rs_forms::widgets::WidgetType;

use crate::directory::UserDirectory;
use crate::models::User;

/// Builds `(value, label)` choice pairs for stored users.
///
/// Unstored users (no primary key) are skipped.
pub fn user_choices(users: &[User]) -> Vec<(String, String)> {
    users
        .iter()
        .filter_map(|u| u.pk.map(|pk| (pk.to_string(), u.display_label())))
        .collect()
}

/// A single-user selection field backed by an autocomplete select.
pub async fn user_choice_field(
    directory: &dyn UserDirectory,
    name: &str,
) -> TallyResult<FormFieldDef> {
    let users = directory.users().await?;
    Ok(FormFieldDef::new(
        name,
        FormFieldType::TypedChoice {
            choices: user_choices(&users),
            coerce: coerce_int,
        },
    )
    .widget(WidgetType::AutocompleteSelect))
}

/// A multiple-user selection field backed by an autocomplete multi-select.
pub async fn user_multiple_choice_field(
    directory: &dyn UserDirectory,
    name: &str,
) -> TallyResult<FormFieldDef> {
    let users = directory.users().await?;
    Ok(FormFieldDef::new(
        name,
        FormFieldType::MultipleChoice {
            choices: user_choices(&users),
        },
    )
    .widget(WidgetType::AutocompleteSelectMultiple))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MemoryDirectory;

    fn seeded() -> MemoryDirectory {
        let dir = MemoryDirectory::new();
        dir.add_user(User::new("adubois").with_name("Anne", "Dubois"));
        dir.add_user(User::new("bsmith"));
        dir
    }

    #[test]
    fn test_user_choices_labels() {
        let users = vec![
            User {
                pk: Some(1),
                ..User::new("adubois").with_name("Anne", "Dubois")
            },
            User {
                pk: Some(2),
                ..User::new("bsmith")
            },
        ];
        let choices = user_choices(&users);
        assert_eq!(
            choices,
            vec![
                ("1".to_string(), "Anne Dubois".to_string()),
                ("2".to_string(), "bsmith".to_string()),
            ]
        );
    }

    #[test]
    fn test_user_choices_skip_unstored() {
        let users = vec![User::new("ghost")];
        assert!(user_choices(&users).is_empty());
    }

    #[tokio::test]
    async fn test_user_choice_field() {
        let dir = seeded();
        let field = user_choice_field(&dir, "assignee").await.unwrap();
        assert_eq!(field.name, "assignee");
        assert_eq!(field.widget, WidgetType::AutocompleteSelect);
        assert_eq!(field.choices().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_user_multiple_choice_field() {
        let dir = seeded();
        let field = user_multiple_choice_field(&dir, "members").await.unwrap();
        assert_eq!(field.name, "members");
        assert_eq!(field.widget, WidgetType::AutocompleteSelectMultiple);
        assert!(matches!(
            field.field_type,
            FormFieldType::MultipleChoice { .. }
        ));
        let labels: Vec<&str> = field
            .choices()
            .unwrap()
            .iter()
            .map(|(_, label)| label.as_str())
            .collect();
        assert_eq!(labels, vec!["Anne Dubois", "bsmith"]);
    }
}
