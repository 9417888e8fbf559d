use std::iter::repeat;
use std::path::{Path, PathBuf};

pub fn find_first_subpath<P: AsRef<Path>, F: Fn(&Path) -> bool>(
    root: impl AsRef<Path>,
    subpaths: &[P],
    search: F,
) -> Option<PathBuf> {
    subpaths
        .iter()
        .zip(repeat(root.as_ref()))
        .map(|(b, a)| a.join(b))
        .find(|it: &PathBuf| search(&it))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_matching_subpath() {
        let found = find_first_subpath("/tmp", &["a", "b"], |_| true);
        assert_eq!(found, Some(PathBuf::from("/tmp/a")));

        let none = find_first_subpath("/tmp", &["a", "b"], |_| false);
        assert_eq!(none, None);
    }
}
