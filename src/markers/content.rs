use crate::geo::{round_to, LatLng};

/// Descriptive popup text for a freshly placed random marker
pub fn random_marker_content(coords: LatLng) -> String {
    format!(
        "This marker is removable and its popup is editable.\n\
         \n\
         This randomly generated marker is at {}° latitude and {}° longitude.\n\
         \n\
         Random markers live in an ordered list owned by the app. Each popup \
         reports back by index: the remove button drops that index from the \
         list and the save button writes the edited text into it.",
        round_to(coords.lat, 3),
        round_to(coords.lng, 3),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_mentions_rounded_coords() {
        let text = random_marker_content(LatLng::new(33.852169, -100.5322));
        assert!(text.contains("33.852° latitude"));
        assert!(text.contains("-100.532° longitude"));
    }
}
