//! Server-wins merge of a remote snapshot into the local collection

use std::collections::HashMap;

use crate::models::Quote;

/// What a merge changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Remote quotes appended because their text was unknown locally
    pub added: usize,
    /// Local quotes whose category was overwritten by the server
    pub updated: usize,
}

impl MergeReport {
    pub fn changed(&self) -> bool {
        self.added > 0 || self.updated > 0
    }
}

/// Merge `remote` into `local`
///
/// Quotes are joined on lowercase text. Unknown remote quotes are appended
/// in remote order; on a match with a different category the server's
/// category replaces the local one. Text is never modified.
///
/// When the local collection holds several quotes with the same key, the
/// last one is the merge target.
pub fn merge_remote(local: &mut Vec<Quote>, remote: &[Quote]) -> MergeReport {
    let mut index: HashMap<String, usize> = local
        .iter()
        .enumerate()
        .map(|(i, q)| (q.key(), i))
        .collect();

    let mut report = MergeReport::default();

    for server_quote in remote {
        let key = server_quote.key();
        match index.get(&key) {
            None => {
                local.push(server_quote.clone());
                index.insert(key, local.len() - 1);
                report.added += 1;
            }
            Some(&i) => {
                if local[i].category != server_quote.category {
                    local[i].category = server_quote.category.clone();
                    report.updated += 1;
                }
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_wins_on_category_conflict() {
        let mut local = vec![Quote::new("a", "X")];
        let report = merge_remote(&mut local, &[Quote::new("a", "Y")]);

        assert_eq!(local, vec![Quote::new("a", "Y")]);
        assert_eq!(report, MergeReport { added: 0, updated: 1 });
        assert!(report.changed());
    }

    #[test]
    fn test_empty_local_takes_remote() {
        let mut local = Vec::new();
        let report = merge_remote(&mut local, &[Quote::new("b", "Server")]);

        assert_eq!(local, vec![Quote::new("b", "Server")]);
        assert_eq!(report.added, 1);
    }

    #[test]
    fn test_join_ignores_text_case() {
        let mut local = vec![Quote::new("Hello World", "Local")];
        merge_remote(&mut local, &[Quote::new("hello world", "Server")]);

        assert_eq!(local.len(), 1);
        // Local text is kept as-is
        assert_eq!(local[0].text, "Hello World");
        assert_eq!(local[0].category, "Server");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let remote = vec![
            Quote::new("a", "Server"),
            Quote::new("b", "Server"),
            Quote::new("c", "Server"),
        ];
        let mut local = vec![Quote::new("a", "Mine"), Quote::new("z", "Mine")];

        let first = merge_remote(&mut local, &remote);
        assert!(first.changed());
        let snapshot = local.clone();

        let second = merge_remote(&mut local, &remote);
        assert!(!second.changed());
        assert_eq!(local, snapshot);
    }

    #[test]
    fn test_unrelated_local_quotes_untouched() {
        let mut local = vec![Quote::new("keep", "Mine")];
        merge_remote(&mut local, &[Quote::new("new", "Server")]);

        assert_eq!(local[0], Quote::new("keep", "Mine"));
        assert_eq!(local[1], Quote::new("new", "Server"));
    }

    #[test]
    fn test_duplicate_remote_keys_collapse() {
        let mut local = Vec::new();
        let report = merge_remote(
            &mut local,
            &[Quote::new("dup", "Server"), Quote::new("DUP", "Server")],
        );

        assert_eq!(local.len(), 1);
        assert_eq!(report, MergeReport { added: 1, updated: 0 });
    }
}
