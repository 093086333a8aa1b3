//! The shared ordering session: one restaurant choice, one deadline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::PollId;

/// One restaurant option on a poll.
///
/// Older poll documents stored options as bare restaurant names; both the
/// legacy and the structured form deserialize, and every write path emits
/// the structured form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MenuOption {
    Entry {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    Name(String),
}

impl MenuOption {
    pub fn name(&self) -> &str {
        match self {
            Self::Entry { name, .. } => name,
            Self::Name(name) => name,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Entry { url, .. } => url.as_deref(),
            Self::Name(_) => None,
        }
    }

    /// Coerces the legacy bare-name form into the structured form.
    pub fn normalized(self) -> Self {
        match self {
            entry @ Self::Entry { .. } => entry,
            Self::Name(name) => Self::Entry { name, url: None },
        }
    }
}

/// Normalizes every option and rewrites the URL of the one matching
/// `restaurant`. Other entries keep their URLs untouched.
pub fn with_menu_url(options: &[MenuOption], restaurant: &str, url: Option<&str>) -> Vec<MenuOption> {
    options
        .iter()
        .cloned()
        .map(MenuOption::normalized)
        .map(|option| {
            if option.name() == restaurant {
                MenuOption::Entry {
                    name: option.name().to_string(),
                    url: url.map(str::to_string),
                }
            } else {
                option
            }
        })
        .collect()
}

/// A shared ordering session tied to a restaurant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: PollId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_restaurant: Option<String>,
    #[serde(default)]
    pub restaurant_options: Vec<MenuOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering_ends_at: Option<DateTime<Utc>>,
}

impl Poll {
    /// Whether the ordering deadline has passed as of `now`. An absent
    /// deadline means ordering stays open.
    pub fn ordering_ended(&self, now: DateTime<Utc>) -> bool {
        self.ordering_ends_at.is_some_and(|ends| ends <= now)
    }
}

/// Payload for creating a new poll.
#[derive(Debug, Clone, Default)]
pub struct PollCreate {
    pub selected_restaurant: Option<String>,
    pub restaurant_options: Vec<MenuOption>,
    pub ordering_ends_at: Option<DateTime<Utc>>,
}

/// Partial update for a poll. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct PollPatch {
    pub ordering_ends_at: Option<DateTime<Utc>>,
    pub restaurant_options: Option<Vec<MenuOption>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn legacy_and_structured_options_both_deserialize() {
        let poll: Poll = serde_json::from_str(
            r#"{
                "id": "poll_1",
                "selectedRestaurant": "Sushi Bar",
                "restaurantOptions": ["Sushi Bar", {"name": "Pizzeria", "url": "https://pizza.example"}],
                "orderingEndsAt": null
            }"#,
        )
        .unwrap();

        assert_eq!(poll.restaurant_options[0], MenuOption::Name("Sushi Bar".to_string()));
        assert_eq!(poll.restaurant_options[1].name(), "Pizzeria");
        assert_eq!(poll.restaurant_options[1].url(), Some("https://pizza.example"));
    }

    #[test]
    fn with_menu_url_normalizes_and_targets_the_selected_entry() {
        let options = vec![
            MenuOption::Name("Sushi Bar".to_string()),
            MenuOption::Name("Kebab House".to_string()),
            MenuOption::Entry {
                name: "Pizzeria".to_string(),
                url: Some("https://pizza.example".to_string()),
            },
        ];

        let updated = with_menu_url(&options, "Sushi Bar", Some("https://sushi.example/menu"));

        assert!(updated.iter().all(|o| matches!(o, MenuOption::Entry { .. })));
        assert_eq!(updated[0].url(), Some("https://sushi.example/menu"));
        assert_eq!(updated[1].url(), None);
        assert_eq!(updated[2].url(), Some("https://pizza.example"));
    }

    #[test]
    fn ordering_ended_tracks_the_deadline() {
        let now = Utc::now();
        let mut poll = Poll {
            id: PollId::from("poll_1"),
            selected_restaurant: None,
            restaurant_options: Vec::new(),
            ordering_ends_at: None,
        };
        assert!(!poll.ordering_ended(now));

        poll.ordering_ends_at = Some(now + Duration::minutes(5));
        assert!(!poll.ordering_ended(now));

        poll.ordering_ends_at = Some(now - Duration::seconds(1));
        assert!(poll.ordering_ended(now));
    }
}
