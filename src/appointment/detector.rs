/// Decides whether an assistant reply confirms a booking.
pub trait BookingDetector: Send + Sync {
    fn is_booking_confirmation(&self, reply: &str) -> bool;
}

/// Fires when every keyword occurs somewhere in the reply, ignoring case.
#[derive(Debug, Clone)]
pub struct KeywordDetector {
    keywords: Vec<String>,
}

impl KeywordDetector {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
        }
    }
}

impl Default for KeywordDetector {
    fn default() -> Self {
        Self::new(["appointment", "confirmed"])
    }
}

impl BookingDetector for KeywordDetector {
    fn is_booking_confirmation(&self, reply: &str) -> bool {
        let reply = reply.to_lowercase();
        self.keywords.iter().all(|k| reply.contains(k.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keywords() {
        let detector = KeywordDetector::default();

        assert!(detector.is_booking_confirmation(
            "Your appointment for a cleaning is confirmed. Name: Bob Service: cleaning"
        ));
        assert!(detector.is_booking_confirmation("APPOINTMENT CONFIRMED!"));
        assert!(!detector.is_booking_confirmation("I am not sure about appointments"));
        assert!(!detector.is_booking_confirmation("Your booking is confirmed."));
        assert!(!detector.is_booking_confirmation(""));
    }

    #[test]
    fn test_substring_heuristic_accepts_negations() {
        // Known false positive of the keyword policy.
        let detector = KeywordDetector::default();
        assert!(detector.is_booking_confirmation("Your appointment is not confirmed yet."));
    }

    #[test]
    fn test_custom_keywords_are_case_insensitive() {
        let detector = KeywordDetector::new(["Booking", "Reserved"]);
        assert!(detector.is_booking_confirmation("booking reserved for Friday"));
        assert!(!detector.is_booking_confirmation("booking pending"));
    }
}
