#[rustfmt::skip]
const STAGES: [&str; 7] = [
r"   -----
   |   |
       |
       |
       |
       |
---------",
r"   -----
   |   |
   O   |
       |
       |
       |
---------",
r"   -----
   |   |
   O   |
   |   |
       |
       |
---------",
r"   -----
   |   |
   O   |
  /|   |
       |
       |
---------",
r"   -----
   |   |
   O   |
  /|\  |
       |
       |
---------",
r"   -----
   |   |
   O   |
  /|\  |
  /    |
       |
---------",
r"   -----
   |   |
   O   |
  /|\  |
  / \  |
       |
---------",
];

/// The gallows drawn after `wrong` wrong guesses.
pub fn stage(wrong: u8) -> &'static str {
    STAGES[usize::from(wrong).min(STAGES.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::stage;

    #[test]
    fn stages_grow() {
        assert!(!stage(0).contains('O'));
        assert!(stage(1).contains('O'));
        assert!(stage(6).contains(r"/ \"));
        assert_eq!(stage(6), stage(40));
    }
}
