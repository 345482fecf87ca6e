//! In-place patching of cached collections.

/// Apply `transform` to every entry matching `predicate`. Returns how many
/// entries were changed.
pub fn patch_matching<T, P, F>(entries: &mut [T], predicate: P, mut transform: F) -> usize
where
    P: Fn(&T) -> bool,
    F: FnMut(&mut T),
{
    let mut patched = 0;
    for entry in entries.iter_mut().filter(|e| predicate(e)) {
        transform(entry);
        patched += 1;
    }
    patched
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_matching_entries_change() {
        let mut flags = vec![(1, false), (2, true), (3, false)];
        let patched = patch_matching(&mut flags, |(_, read)| !read, |(_, read)| *read = true);
        assert_eq!(patched, 2);
        assert!(flags.iter().all(|(_, read)| *read));
        assert_eq!(patch_matching(&mut flags, |(_, read)| !read, |_| {}), 0);
    }
}
