use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::session::{Role, Session};
use crate::store::preferences::PreferencesStore;
use crate::ui::ui_layout_utils::centered_rect;

/// First-run question asking the signed-in user for their role
#[derive(Debug, Default)]
pub struct RoleSurvey {
    highlighted: usize,
}

impl RoleSurvey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highlighted(&self) -> Role {
        Role::ALL[self.highlighted % Role::ALL.len()]
    }

    pub fn move_by(&mut self, delta: isize) {
        let len = Role::ALL.len() as isize;
        self.highlighted = (self.highlighted as isize + delta).rem_euclid(len) as usize;
    }

    /// Store the highlighted role on the session and persist it when a store
    /// and a user id are available
    pub fn confirm(
        &self,
        session: &mut Session,
        store: Option<&mut PreferencesStore>,
    ) -> Result<Role, crate::store::StoreError> {
        let role = self.highlighted();
        session.preferences.choose_role(role);
        if let (Some(store), Some(user)) = (store, session.user.as_ref()) {
            store.save(&user.uid, &session.preferences)?;
        }
        tracing::info!(target: "session", "Role survey answered: {}", role);
        Ok(role)
    }

    pub fn render(&self, f: &mut Frame) {
        let area = centered_rect(50, 40, f.area());
        f.render_widget(Clear, area);

        let mut lines = vec![
            Line::from(Span::styled(
                "Welcome! How will you use this dashboard?",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for role in Role::ALL {
            let selected = role == self.highlighted();
            let marker = if selected { "(•) " } else { "( ) " };
            let style = if selected {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(format!("{}{}", marker, role.label()), style)));
        }
        lines.push(Line::from(""));
        lines.push(Line::from("↑↓ choose · Enter confirm · Esc later"));

        let popup = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Role Survey"))
            .wrap(Wrap { trim: true });
        f.render_widget(popup, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{UserIdentity, UserPreferences};

    #[test]
    fn test_confirm_persists_choice() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PreferencesStore::open(dir.path().join("prefs.json")).unwrap();
        let user = UserIdentity {
            uid: "u1".to_string(),
            email: None,
            display_name: None,
        };
        let mut session = Session::new(Some(user), UserPreferences::default());

        let mut survey = RoleSurvey::new();
        survey.move_by(1);
        assert_eq!(survey.confirm(&mut session, Some(&mut store)).unwrap(), Role::Admin);
        assert!(!session.needs_role_survey());
        assert!(store.load("u1").role_survey_completed);

        survey.move_by(1);
        assert_eq!(survey.highlighted(), Role::Candidate);
    }
}
