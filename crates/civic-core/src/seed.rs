//! Fixed mock dataset used to populate an empty store.

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::{
    Category, Comment, Department, Issue, Location, Priority, Role, Status, User,
};

/// Midnight UTC on a `YYYY-MM-DD` literal from the dataset below.
fn day(ymd: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(ymd, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map_or(DateTime::<Utc>::UNIX_EPOCH, |naive| naive.and_utc())
}

const PEXELS: &str = "https://images.pexels.com/photos";
const PHOTO_PARAMS: &str = "auto=compress&cs=tinysrgb&w=500&h=300&fit=crop";

fn photo(id: u32) -> String {
    format!("{PEXELS}/{id}/pexels-photo-{id}.jpeg?{PHOTO_PARAMS}")
}

#[must_use]
pub fn issues() -> Vec<Issue> {
    vec![
        Issue {
            id: "1".into(),
            title: "Pothole on Main Street".into(),
            description: "Large pothole causing traffic issues near the market area".into(),
            category: Category::RoadMaintenance,
            location: Location {
                lat: 23.0225,
                lng: 72.5714,
                address: "Main Street, Ahmedabad, Gujarat".into(),
            },
            photos: vec![photo(1_125_766)],
            status: Status::Assigned,
            priority: Priority::High,
            created_at: day("2024-01-15"),
            updated_at: day("2024-01-16"),
            upvotes: 15,
            is_anonymous: false,
            reporter_id: Some("user1".into()),
            assigned_department: Some("roads".into()),
            assigned_staff: Some("Rajesh Kumar".into()),
            public_comments: vec![Comment {
                id: "c1".into(),
                text: "This has been assigned to our road maintenance team. Expected resolution in 3-5 days.".into(),
                author: "Municipal Office".into(),
                created_at: day("2024-01-16"),
                is_official: true,
            }],
        },
        Issue {
            id: "2".into(),
            title: "Streetlight Not Working".into(),
            description:
                "Street light has been non-functional for over a week, creating safety concerns"
                    .into(),
            category: Category::StreetLighting,
            location: Location {
                lat: 23.0395,
                lng: 72.5666,
                address: "Park Avenue, Ahmedabad, Gujarat".into(),
            },
            photos: vec![photo(1_108_572)],
            status: Status::Resolved,
            priority: Priority::Medium,
            created_at: day("2024-01-10"),
            updated_at: day("2024-01-18"),
            upvotes: 8,
            is_anonymous: false,
            reporter_id: Some("user2".into()),
            assigned_department: Some("electricity".into()),
            assigned_staff: Some("Priya Patel".into()),
            public_comments: vec![Comment {
                id: "c2".into(),
                text: "Issue has been resolved. New LED streetlight installed.".into(),
                author: "Priya Patel".into(),
                created_at: day("2024-01-18"),
                is_official: true,
            }],
        },
        Issue {
            id: "3".into(),
            title: "Garbage Collection Missed".into(),
            description: "Garbage has not been collected for 3 days in our locality".into(),
            category: Category::WasteManagement,
            location: Location {
                lat: 23.0545,
                lng: 72.5425,
                address: "Satellite Road, Ahmedabad, Gujarat".into(),
            },
            photos: vec![photo(3_938_022)],
            status: Status::Acknowledged,
            priority: Priority::High,
            created_at: day("2024-01-20"),
            updated_at: day("2024-01-20"),
            upvotes: 23,
            is_anonymous: true,
            reporter_id: None,
            assigned_department: Some("sanitation".into()),
            assigned_staff: None,
            public_comments: Vec::new(),
        },
    ]
}

fn department(
    id: &str,
    name: &str,
    categories: [&str; 3],
    avg_response_time: f64,
    total_issues: u32,
    resolved_issues: u32,
) -> Department {
    Department {
        id: id.into(),
        name: name.into(),
        categories: categories.iter().map(ToString::to_string).collect(),
        avg_response_time,
        total_issues,
        resolved_issues,
    }
}

/// Department reference table shown on the analytics page.
#[must_use]
pub fn departments() -> Vec<Department> {
    vec![
        department(
            "roads",
            "Road Maintenance",
            ["Road Maintenance", "Traffic Signals", "Signage"],
            4.2,
            145,
            128,
        ),
        department(
            "electricity",
            "Electrical Department",
            ["Street Lighting", "Power Lines", "Electrical Safety"],
            2.8,
            89,
            84,
        ),
        department(
            "sanitation",
            "Sanitation Department",
            ["Waste Management", "Drainage", "Public Toilets"],
            3.1,
            234,
            201,
        ),
        department(
            "water",
            "Water Department",
            ["Water Leaks", "Water Supply", "Sewerage"],
            5.5,
            67,
            45,
        ),
    ]
}

#[must_use]
pub fn users() -> Vec<User> {
    vec![
        User {
            id: "user1".into(),
            name: "Amit Sharma".into(),
            email: "amit@example.com".into(),
            role: Role::Citizen,
            department: None,
        },
        User {
            id: "user2".into(),
            name: "Priya Patel".into(),
            email: "priya@municipal.gov".into(),
            role: Role::Staff,
            department: Some("electricity".into()),
        },
        User {
            id: "admin1".into(),
            name: "Raj Kumar".into(),
            email: "raj@municipal.gov".into(),
            role: Role::Admin,
            department: None,
        },
    ]
}

/// Look up a seed user by id.
#[must_use]
pub fn user(id: &str) -> Option<User> {
    users().into_iter().find(|u| u.id == id)
}

/// Mean response time quoted on the analytics page, in days.
pub const AVG_RESPONSE_DAYS: f64 = 3.2;
