//! Namespacing formatter for hand-written `.env` files.
//!
//! Imports a project's `.env` into records keyed `PROJECT/ENV/VAR`, so files
//! from many projects and environments can share one vault without key
//! collisions. Doc comments in these files PRECEDE the variable they
//! describe, which is the opposite of the export format in
//! [`crate::convert`].

use std::collections::HashMap;

use crate::record::SecretRecord;

/// Build the `PROJECT/ENV/VAR` key. `project` and `env` are uppercased.
pub fn namespaced_key(project: &str, env: &str, var: &str) -> String {
    format!("{}/{}/{var}", project.to_uppercase(), env.to_uppercase())
}

/// Note attached to every namespaced record.
fn namespaced_note(project: &str, env: &str, notes: &str) -> String {
    format!("Created with Code PROJECT: {project}\nENV: {env}\n{notes}")
}

/// Split a non-comment line into `(key, value)`, both trimmed.
fn entry(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    (!key.is_empty()).then_some((key, value.trim()))
}

fn is_skipped(line: &str) -> bool {
    line.is_empty() || line.starts_with("//")
}

/// Parse a `.env` file whose comments precede their variable into
/// namespaced records.
///
/// Consecutive `#` lines become the note of the next `KEY=VALUE` line; blank
/// lines and `//` lines in between do not break the association. Records
/// carry no id: the vault assigns one when they are created remotely.
pub fn from_env_text_namespaced(text: &str, project: &str, env: &str) -> Vec<SecretRecord> {
    let project = project.to_uppercase();
    let env = env.to_uppercase();

    let mut notes_by_key: HashMap<&str, String> = HashMap::new();
    let mut pending: Vec<&str> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim();
        if is_skipped(line) {
            continue;
        }
        if let Some(comment) = line.strip_prefix('#') {
            pending.push(comment.trim());
            continue;
        }
        if let Some((key, _)) = entry(line) {
            notes_by_key.insert(key, pending.join("\n"));
            pending.clear();
        }
    }

    text.lines()
        .map(str::trim)
        .filter(|line| !is_skipped(line) && !line.starts_with('#'))
        .filter_map(entry)
        .map(|(key, value)| {
            let notes = notes_by_key.get(key).map_or("", String::as_str);
            SecretRecord::new(
                namespaced_key(&project, &env, key),
                value,
                namespaced_note(&project, &env, notes),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_entry_is_namespaced_and_uppercased() {
        let records = from_env_text_namespaced("API_KEY=abc", "myapp", "dev");

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.key, "MYAPP/DEV/API_KEY");
        assert_eq!(record.value, "abc");
        assert!(record.id.is_empty());
        assert!(record.note.contains("PROJECT: MYAPP"));
        assert!(record.note.contains("ENV: DEV"));
        assert_eq!(record.note, "Created with Code PROJECT: MYAPP\nENV: DEV\n");
    }

    #[test]
    fn leading_comments_become_the_note() {
        let text = "# Stripe secret key\n# rotate monthly\nSTRIPE_KEY=sk_live_1\nPLAIN=1\n";
        let records = from_env_text_namespaced(text, "shop", "prod");

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].note,
            "Created with Code PROJECT: SHOP\nENV: PROD\nStripe secret key\nrotate monthly"
        );
        assert_eq!(records[1].note, "Created with Code PROJECT: SHOP\nENV: PROD\n");
    }

    #[test]
    fn blank_and_slash_lines_keep_pending_notes() {
        let text = "# database\n\n// legacy marker\nDB_URL=postgres://u:p@h/db\n";
        let records = from_env_text_namespaced(text, "a", "b");

        assert_eq!(records[0].value, "postgres://u:p@h/db");
        assert!(records[0].note.ends_with("\ndatabase"));
    }

    #[test]
    fn comments_are_consumed_by_the_first_following_entry() {
        let text = "#doc for first\nFIRST=1\nSECOND=2\n";
        let records = from_env_text_namespaced(text, "p", "e");

        assert!(records[0].note.ends_with("doc for first"));
        assert!(records[1].note.ends_with("ENV: E\n"));
    }

    #[test]
    fn repeated_key_takes_the_last_notes() {
        let records = from_env_text_namespaced("# a\nX=1\n# b\nX=2\n", "p", "e");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value, "1");
        assert_eq!(records[1].value, "2");
        assert_eq!(records[0].note, "Created with Code PROJECT: P\nENV: E\nb");
        assert_eq!(records[1].note, records[0].note);
    }

    #[test]
    fn values_are_trimmed_and_keep_equals() {
        let records = from_env_text_namespaced("  TOKEN =  a=b=c  \n", "p", "e");
        assert_eq!(records[0].key, "P/E/TOKEN");
        assert_eq!(records[0].value, "a=b=c");
    }

    #[test]
    fn non_entries_are_ignored() {
        let text = "// only a comment\nnot an entry\n=missing key\n";
        assert!(from_env_text_namespaced(text, "p", "e").is_empty());
    }

    #[test]
    fn namespaced_key_uppercases_context_only() {
        assert_eq!(namespaced_key("web", "staging", "db_url"), "WEB/STAGING/db_url");
    }
}
