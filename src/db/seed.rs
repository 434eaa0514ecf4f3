use rusqlite::{params, Connection};

use crate::db::queries;
use crate::models::{NewSalon, NewService};

struct DemoSalon {
    name: &'static str,
    address: &'static str,
    description: &'static str,
    rating: f64,
    review_count: i64,
    services: &'static [(&'static str, u32, u32)],
}

const DEMO_SALONS: &[DemoSalon] = &[
    DemoSalon {
        name: "The Royal Clipper",
        address: "123, Main Street, Mumbai",
        description: "A premium barber shop specializing in modern haircuts and beard styling.",
        rating: 4.8,
        review_count: 250,
        services: &[("Haircut", 500, 45), ("Beard Trim", 250, 30), ("Shaving", 300, 30)],
    },
    DemoSalon {
        name: "Style & Shears",
        address: "456, Gandhi Nagar, Mumbai",
        description: "A trendy salon offering a wide range of services from haircuts to hair coloring.",
        rating: 4.5,
        review_count: 180,
        services: &[("Haircut", 400, 45), ("Hair Spa", 800, 60), ("Coloring", 1500, 90)],
    },
    DemoSalon {
        name: "Urban Beard Co.",
        address: "789, MG Road, Mumbai",
        description: "Your go-to spot for classic grooming, focused on beards and traditional shaves.",
        rating: 4.9,
        review_count: 320,
        services: &[("Beard Trim", 300, 30), ("Hot Towel Shave", 450, 45)],
    },
];

/// Populates an empty catalog with demo salons. Returns how many salons
/// were added; a non-empty catalog is left untouched.
pub fn seed_demo_catalog(conn: &Connection) -> anyhow::Result<usize> {
    if queries::count_salons(conn)? > 0 {
        return Ok(0);
    }

    let now = chrono::Utc::now().naive_utc();
    for demo in DEMO_SALONS {
        let salon = queries::insert_salon(
            conn,
            None,
            &NewSalon {
                name: demo.name.to_string(),
                address: demo.address.to_string(),
                description: demo.description.to_string(),
                image_url: None,
            },
            &now,
        )?;
        conn.execute(
            "UPDATE salons SET rating = ?1, review_count = ?2 WHERE id = ?3",
            params![demo.rating, demo.review_count, salon.id],
        )?;

        let services: Vec<NewService> = demo
            .services
            .iter()
            .map(|(name, price, duration_minutes)| NewService {
                name: name.to_string(),
                price: *price,
                duration_minutes: *duration_minutes,
            })
            .collect();
        queries::insert_services(conn, &salon.id, &services, &now)?;
    }

    tracing::info!(count = DEMO_SALONS.len(), "seeded demo catalog");
    Ok(DEMO_SALONS.len())
}
