//! Built-in sample source used until real provider integrations are wired in.

use chrono::{DateTime, Duration, Utc};

use super::EventProvider;
use crate::models::Event;

pub struct SampleProvider;

struct SampleRow {
    title: &'static str,
    days_ahead: i64,
    time: &'static str,
    venue: &'static str,
    description: &'static str,
    age_hints: &'static str,
    link: &'static str,
}

const SAMPLE_EVENTS: &[SampleRow] = &[
    SampleRow {
        title: "Kids Arts and Crafts Workshop",
        days_ahead: 2,
        time: "10:00 AM - 12:00 PM",
        venue: "Community Center",
        description: "Join us for a fun arts and crafts session! Kids will create their own masterpieces using various materials. All ages welcome.",
        age_hints: "Ages 4-12",
        link: "https://example.com/events/arts-crafts",
    },
    SampleRow {
        title: "Story Time at the Library",
        days_ahead: 3,
        time: "11:00 AM - 12:00 PM",
        venue: "Public Library",
        description: "Interactive story time for young children with songs, stories, and activities.",
        age_hints: "Ages 2-6",
        link: "https://example.com/events/story-time",
    },
    SampleRow {
        title: "Parent-Child Yoga Class",
        days_ahead: 4,
        time: "10:00 AM - 11:00 AM",
        venue: "Wellness Center",
        description: "Relaxing yoga session designed for parents and children to enjoy together.",
        age_hints: "Ages 3+ with parent",
        link: "https://example.com/events/yoga",
    },
    SampleRow {
        title: "Family Movie Night in the Park",
        days_ahead: 5,
        time: "7:00 PM - 9:00 PM",
        venue: "Central Park",
        description: "Bring your blankets and enjoy a family-friendly movie under the stars. Popcorn and drinks available.",
        age_hints: "All ages",
        link: "https://example.com/events/movie-night",
    },
    SampleRow {
        title: "Farmers Market Family Day",
        days_ahead: 6,
        time: "8:00 AM - 1:00 PM",
        venue: "Town Square",
        description: "Local farmers market with kids activities, live music, and fresh produce. Family-friendly atmosphere.",
        age_hints: "All ages",
        link: "https://example.com/events/farmers-market",
    },
    SampleRow {
        title: "Soccer Camp for Kids",
        days_ahead: 7,
        time: "9:00 AM - 3:00 PM",
        venue: "Sports Complex",
        description: "Week-long soccer camp for children. Learn skills, teamwork, and sportsmanship. Registration required.",
        age_hints: "Ages 6-14",
        link: "https://example.com/events/soccer-camp",
    },
    SampleRow {
        title: "Little League Baseball Game",
        days_ahead: 8,
        time: "4:00 PM - 6:00 PM",
        venue: "Baseball Field",
        description: "Local little league championship game. Come support the young athletes!",
        age_hints: "All ages welcome to watch",
        link: "https://example.com/events/baseball",
    },
    SampleRow {
        title: "Community Picnic and Games",
        days_ahead: 9,
        time: "12:00 PM - 4:00 PM",
        venue: "Riverside Park",
        description: "Annual community picnic with games, contests, and food. Bring the whole family for a fun day out.",
        age_hints: "All ages",
        link: "https://example.com/events/picnic",
    },
    SampleRow {
        title: "Science Fair for Young Explorers",
        days_ahead: 10,
        time: "1:00 PM - 4:00 PM",
        venue: "Science Museum",
        description: "Hands-on science experiments and demonstrations. Kids can participate in interactive exhibits.",
        age_hints: "Ages 5-12",
        link: "https://example.com/events/science-fair",
    },
    SampleRow {
        title: "Cooking Class for Teens",
        days_ahead: 12,
        time: "2:00 PM - 4:00 PM",
        venue: "Culinary School",
        description: "Learn basic cooking skills and make delicious meals. Perfect for teenagers interested in cooking.",
        age_hints: "Ages 13-18",
        link: "https://example.com/events/cooking-class",
    },
    SampleRow {
        title: "Art Gallery Family Tour",
        days_ahead: 14,
        time: "11:00 AM - 12:30 PM",
        venue: "Art Museum",
        description: "Guided tour of the current exhibition, designed for families with children. Interactive and educational.",
        age_hints: "Ages 6+",
        link: "https://example.com/events/art-tour",
    },
    SampleRow {
        title: "Ballet Performance - The Nutcracker",
        days_ahead: 15,
        time: "6:00 PM - 8:00 PM",
        venue: "Performing Arts Center",
        description: "Classic ballet performance suitable for families. A magical experience for all ages.",
        age_hints: "Ages 5+",
        link: "https://example.com/events/ballet",
    },
];

impl EventProvider for SampleProvider {
    fn name(&self) -> &'static str {
        "sample"
    }

    fn fetch(
        &self,
        location_key: &str,
        window_end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Event>> {
        let now = Utc::now();
        Ok(SAMPLE_EVENTS
            .iter()
            .map(|row| {
                let mut event = Event::new(row.title, now + Duration::days(row.days_ahead));
                event.time = Some(row.time.to_string());
                event.location = Some(format!("{location_key} {}", row.venue));
                event.description = Some(row.description.to_string());
                event.age_hints = Some(row.age_hints.to_string());
                event.gender_hints = Some("All genders".to_string());
                event.link = Some(row.link.to_string());
                event
            })
            .filter(|event| event.date <= window_end)
            .collect())
    }
}
