//! Groups raw feed activities into "X and N others did Y" rows.

use std::collections::HashSet;

use uuid::Uuid;

use sidechain_core::types::FeedActivity;
use sidechain_entity::notification::NotificationGroup;

/// Characters of preview text shown after comment and mention phrases.
const DISPLAY_PREVIEW_CHARS: usize = 50;

/// Running state of the group currently being built.
struct GroupBuilder {
    group: NotificationGroup,
    actors: HashSet<Uuid>,
}

impl GroupBuilder {
    fn start(activity: &FeedActivity) -> Self {
        let mut actors = HashSet::new();
        actors.insert(activity.actor_id);
        Self {
            group: NotificationGroup {
                id: activity.id,
                verb: activity.verb.clone(),
                aggregation_key: activity.aggregation_key.clone(),
                first_actor_id: activity.actor_id,
                first_actor_name: activity.actor_name.clone(),
                actor_count: 1,
                activity_count: 1,
                is_read: activity.is_read,
                is_seen: activity.is_seen,
                updated_at: activity.created_at,
                preview: non_empty(activity.preview.as_deref()),
                text: String::new(),
                activity_ids: vec![activity.id],
            },
            actors,
        }
    }

    fn accepts(&self, activity: &FeedActivity) -> bool {
        self.group.verb == activity.verb && self.group.aggregation_key == activity.aggregation_key
    }

    fn push(&mut self, activity: &FeedActivity) {
        let group = &mut self.group;
        if self.actors.insert(activity.actor_id) {
            group.actor_count += 1;
        }
        group.activity_count += 1;
        group.is_read &= activity.is_read;
        group.is_seen &= activity.is_seen;
        group.updated_at = group.updated_at.max(activity.created_at);
        if group.preview.is_none() {
            group.preview = non_empty(activity.preview.as_deref());
        }
        group.activity_ids.push(activity.id);
    }

    fn finish(mut self) -> NotificationGroup {
        self.group.text = display_text(&self.group);
        self.group
    }
}

fn non_empty(text: Option<&str>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty()).map(str::to_string)
}

/// Fold chronologically ordered activities (oldest first) into groups,
/// newest group first.
///
/// A new group starts whenever the verb or aggregation key differs from the
/// previous activity. Repeated activity IDs are ignored after their first
/// occurrence.
pub fn aggregate(activities: &[FeedActivity]) -> Vec<NotificationGroup> {
    let mut seen = HashSet::new();
    let mut groups = Vec::new();
    let mut current: Option<GroupBuilder> = None;

    for activity in activities {
        if !seen.insert(activity.id) {
            continue;
        }
        match current.as_mut() {
            Some(builder) if builder.accepts(activity) => builder.push(activity),
            _ => {
                if let Some(done) = current.replace(GroupBuilder::start(activity)) {
                    groups.push(done.finish());
                }
            }
        }
    }
    if let Some(done) = current {
        groups.push(done.finish());
    }

    groups.reverse();
    groups
}

/// Render the summary line for a group.
pub fn display_text(group: &NotificationGroup) -> String {
    let name = if group.first_actor_name.is_empty() {
        group.first_actor_id.to_string()
    } else {
        group.first_actor_name.clone()
    };

    let subject = match group.actor_count.saturating_sub(1) {
        0 => name,
        1 => format!("{name} and 1 other"),
        others => format!("{name} and {others} others"),
    };

    let (phrase, with_preview) = match group.verb.as_str() {
        "like" => ("liked your loop", false),
        "follow" => ("started following you", false),
        "comment" => ("commented on your loop", true),
        "mention" => ("mentioned you", true),
        "repost" => ("reposted your loop", false),
        other => (other, false),
    };

    match group.preview.as_deref() {
        Some(preview) if with_preview => {
            let short: String = preview.chars().take(DISPLAY_PREVIEW_CHARS).collect();
            format!("{subject} {phrase}: \"{short}\"")
        }
        _ => format!("{subject} {phrase}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use sidechain_core::types::aggregation_key;

    fn activity(actor: (Uuid, &str), verb: &str, minute: i64) -> FeedActivity {
        let created_at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap() + Duration::minutes(minute);
        FeedActivity {
            id: Uuid::new_v4(),
            actor_id: actor.0,
            actor_name: actor.1.to_string(),
            verb: verb.to_string(),
            object_id: Uuid::new_v4(),
            preview: None,
            created_at,
            aggregation_key: aggregation_key(verb, created_at),
            is_read: false,
            is_seen: false,
        }
    }

    #[test]
    fn test_three_likers_collapse_into_one_row() {
        let alice = (Uuid::new_v4(), "alice");
        let bob = (Uuid::new_v4(), "bob");
        let carol = (Uuid::new_v4(), "carol");
        let events = vec![
            activity(alice, "like", 0),
            activity(bob, "like", 1),
            activity(carol, "like", 2),
            activity(alice, "like", 3),
        ];

        let groups = aggregate(&events);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].actor_count, 3);
        assert_eq!(groups[0].activity_count, 4);
        assert_eq!(groups[0].text, "alice and 2 others liked your loop");
        assert_eq!(groups[0].updated_at, events[3].created_at);
    }

    #[test]
    fn test_verb_change_starts_new_group_newest_first() {
        let alice = (Uuid::new_v4(), "alice");
        let bob = (Uuid::new_v4(), "bob");
        let groups = aggregate(&[
            activity(alice, "like", 0),
            activity(bob, "follow", 1),
            activity(alice, "like", 2),
        ]);

        let texts: Vec<&str> = groups.iter().map(|g| g.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "alice liked your loop",
                "bob started following you",
                "alice liked your loop"
            ]
        );
    }

    #[test]
    fn test_day_boundary_splits_groups() {
        let alice = (Uuid::new_v4(), "alice");
        let bob = (Uuid::new_v4(), "bob");
        let groups = aggregate(&[activity(alice, "like", 0), activity(bob, "like", 24 * 60)]);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_read_and_seen_require_every_member() {
        let alice = (Uuid::new_v4(), "alice");
        let bob = (Uuid::new_v4(), "bob");
        let mut first = activity(alice, "like", 0);
        first.is_read = true;
        first.is_seen = true;
        let mut second = activity(bob, "like", 1);
        second.is_seen = true;

        let groups = aggregate(&[first, second]);
        assert!(!groups[0].is_read);
        assert!(groups[0].is_seen);
    }

    #[test]
    fn test_duplicate_ids_collapse_and_output_is_stable() {
        let alice = (Uuid::new_v4(), "alice");
        let bob = (Uuid::new_v4(), "bob");
        let first = activity(alice, "like", 0);
        let events = vec![first.clone(), activity(bob, "like", 1), first];

        let once = aggregate(&events);
        assert_eq!(once[0].activity_count, 2);
        assert_eq!(once[0].text, "alice and 1 other liked your loop");
        assert_eq!(aggregate(&events), once);
    }

    #[test]
    fn test_comment_preview_truncated_and_unknown_verb_literal() {
        let alice = (Uuid::new_v4(), "");
        let mut comment = activity(alice, "comment", 0);
        comment.preview = Some("y".repeat(80));
        let challenge = activity((Uuid::new_v4(), "dj"), "challenge_entered", 1);

        let groups = aggregate(&[comment, challenge]);
        assert_eq!(groups[0].text, "dj challenge_entered");
        assert_eq!(
            groups[1].text,
            format!("{} commented on your loop: \"{}\"", alice.0, "y".repeat(50))
        );
    }
}
