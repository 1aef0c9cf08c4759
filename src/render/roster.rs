use std::collections::{BTreeMap, HashMap};

use crate::models::Player;

use super::format_duration;

/// Leading invisible marks keep Discord from trimming the indent.
const INDENT: &str = "\u{200e} \u{200e} ";

/// Group heading for players without a slot (spectators)
const NO_ROLE: &str = "Spectators";

/// Render connected players grouped by role.
///
/// Roles and the names inside each role are sorted ascending, so the output
/// does not depend on the order the status file listed sessions in.
pub fn render_roster(players: &HashMap<String, Player>) -> Option<String> {
    if players.is_empty() {
        return None;
    }

    let mut groups: BTreeMap<&str, Vec<&Player>> = BTreeMap::new();
    for player in players.values() {
        let role = if player.role.trim().is_empty() {
            NO_ROLE
        } else {
            player.role.as_str()
        };
        groups.entry(role).or_default().push(player);
    }

    let blocks: Vec<String> = groups
        .into_iter()
        .map(|(role, mut members)| {
            members.sort_by(|a, b| {
                a.name
                    .cmp(&b.name)
                    .then_with(|| a.online_time.cmp(&b.online_time))
            });

            let mut block = format!("**{role}**");
            for player in members {
                block.push('\n');
                block.push_str(INDENT);
                block.push_str(&player.name);
                if let Some(secs) = player.online_time {
                    block.push_str(&format!(" ({})", format_duration(secs)));
                }
            }
            block
        })
        .collect();

    Some(blocks.join("\n\n"))
}
