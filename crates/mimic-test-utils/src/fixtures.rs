// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation fixtures shared by the crate test suites.

/// Message/response pairs in the style of a casual WhatsApp chat.
pub fn sample_pairs() -> Vec<(String, String)> {
    [
        ("Aslam alikum", "walaikum salam! kya haal hai"),
        ("Kya hal ha?", "theek hoon yr, tum sunao"),
        ("kya haal h", "bas yr theek, tum batao 😄"),
        ("Kya kr rhe ho", "kuch khaas nahi, bas chill"),
        ("kal milte hain?", "haan pakka, kal milte hain"),
        ("khana kha liya?", "haan yr kha liya, tum ne?"),
        ("movie chalein?", "acha idea hai yr, kab?"),
        ("so gaye kya", "nahi yr abhi jag rahi hoon"),
    ]
    .into_iter()
    .map(|(m, r)| (m.to_string(), r.to_string()))
    .collect()
}

/// Response-only corpus in which "bas yr" and "theek hoon" recur often
/// enough to clear a minimum frequency of 3.
pub fn phrase_corpus() -> Vec<String> {
    [
        "bas yr theek hoon",
        "bas yr",
        "theek hoon yr",
        "bas yr chill",
        "haan theek hoon",
        "acha",
        "acha yr",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
