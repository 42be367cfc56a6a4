/// Leading space count of the first line that is not blank.
pub fn leading_spaces(text: &str) -> usize {
    text.split('\n')
        .find(|line| !line.trim().is_empty())
        .map_or(0, |line| line.chars().take_while(|&c| c == ' ').count())
}

/// Lines shorter than the indent become empty. Tabs are not counted.
pub fn rebase(text: &str) -> String {
    let k = leading_spaces(text);
    if k == 0 {
        return text.to_string();
    }
    text.split('\n')
        .map(|line| line.char_indices().nth(k).map_or("", |(i, _)| &line[i..]))
        .collect::<Vec<_>>()
        .join("\n")
}
