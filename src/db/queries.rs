use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::booking::{DATE_FORMAT, TIME_FORMAT};
use crate::models::{Booking, BookingStatus, NewSalon, NewService, Salon, Service, User};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── Users ──

pub fn get_user(conn: &Connection, id: &str) -> anyhow::Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT id, phone_number, full_name, created_at FROM users WHERE id = ?1",
            params![id],
            |row| Ok(parse_user_row(row)),
        )
        .optional()?;
    user.transpose()
}

pub fn get_user_by_phone(conn: &Connection, phone: &str) -> anyhow::Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT id, phone_number, full_name, created_at FROM users WHERE phone_number = ?1",
            params![phone],
            |row| Ok(parse_user_row(row)),
        )
        .optional()?;
    user.transpose()
}

/// Returns the user for `phone`, creating it on first sight. An existing
/// user is never modified.
pub fn find_or_create_user(
    conn: &Connection,
    phone: &str,
    full_name: Option<&str>,
    now: &NaiveDateTime,
) -> anyhow::Result<User> {
    let id = uuid::Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO users (id, phone_number, full_name, created_at) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(phone_number) DO NOTHING",
        params![id, phone, full_name, now.format(TIMESTAMP_FORMAT).to_string()],
    )?;

    get_user_by_phone(conn, phone)?
        .ok_or_else(|| anyhow::anyhow!("user row for {phone} missing after insert"))
}

fn parse_user_row(row: &rusqlite::Row) -> anyhow::Result<User> {
    let created_at: String = row.get(3)?;
    Ok(User {
        id: row.get(0)?,
        phone_number: row.get(1)?,
        full_name: row.get(2)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

// ── Salons & Services ──

pub fn list_salons(conn: &Connection, search: Option<&str>) -> anyhow::Result<Vec<Salon>> {
    let pattern = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s.to_lowercase()));

    let mut stmt = conn.prepare(
        "SELECT id, owner_id, name, address, description, image_url, rating, review_count, created_at
         FROM salons
         WHERE ?1 IS NULL OR lower(name) LIKE ?1 OR lower(address) LIKE ?1
         ORDER BY rating DESC, name ASC",
    )?;
    let rows = stmt.query_map(params![pattern], |row| Ok(parse_salon_row(row)))?;

    let mut salons = vec![];
    for row in rows {
        let mut salon = row??;
        salon.services = get_services_for_salon(conn, &salon.id)?;
        salons.push(salon);
    }
    Ok(salons)
}

pub fn get_salon(conn: &Connection, id: &str) -> anyhow::Result<Option<Salon>> {
    let salon = conn
        .query_row(
            "SELECT id, owner_id, name, address, description, image_url, rating, review_count, created_at
             FROM salons WHERE id = ?1",
            params![id],
            |row| Ok(parse_salon_row(row)),
        )
        .optional()?;

    match salon {
        Some(salon) => {
            let mut salon = salon?;
            salon.services = get_services_for_salon(conn, &salon.id)?;
            Ok(Some(salon))
        }
        None => Ok(None),
    }
}

pub fn insert_salon(
    conn: &Connection,
    owner_id: Option<&str>,
    fields: &NewSalon,
    now: &NaiveDateTime,
) -> anyhow::Result<Salon> {
    let salon = Salon {
        id: uuid::Uuid::new_v4().to_string(),
        owner_id: owner_id.map(str::to_string),
        name: fields.name.trim().to_string(),
        address: fields.address.trim().to_string(),
        description: fields.description.trim().to_string(),
        image_url: fields
            .image_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        rating: 0.0,
        review_count: 0,
        services: vec![],
        created_at: *now,
    };

    conn.execute(
        "INSERT INTO salons (id, owner_id, name, address, description, image_url, rating, review_count, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            salon.id,
            salon.owner_id,
            salon.name,
            salon.address,
            salon.description,
            salon.image_url,
            salon.rating,
            salon.review_count,
            now.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(salon)
}

/// Inserts all services in one transaction: either every service is
/// stored or none is.
pub fn insert_services(
    conn: &Connection,
    salon_id: &str,
    services: &[NewService],
    now: &NaiveDateTime,
) -> anyhow::Result<Vec<Service>> {
    let tx = conn.unchecked_transaction()?;
    let created_at = now.format(TIMESTAMP_FORMAT).to_string();

    let mut created = Vec::with_capacity(services.len());
    for svc in services {
        let service = Service {
            id: uuid::Uuid::new_v4().to_string(),
            salon_id: salon_id.to_string(),
            name: svc.name.trim().to_string(),
            price: i64::from(svc.price),
            duration_minutes: i64::from(svc.duration_minutes),
        };
        tx.execute(
            "INSERT INTO services (id, salon_id, name, price, duration_minutes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                service.id,
                service.salon_id,
                service.name,
                service.price,
                service.duration_minutes,
                created_at,
            ],
        )?;
        created.push(service);
    }

    tx.commit()?;
    Ok(created)
}

pub fn count_salons(conn: &Connection) -> anyhow::Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM salons", [], |row| row.get(0))?)
}

fn get_services_for_salon(conn: &Connection, salon_id: &str) -> anyhow::Result<Vec<Service>> {
    let mut stmt = conn.prepare(
        "SELECT id, salon_id, name, price, duration_minutes
         FROM services WHERE salon_id = ?1 ORDER BY rowid ASC",
    )?;
    let rows = stmt.query_map(params![salon_id], |row| {
        Ok(Service {
            id: row.get(0)?,
            salon_id: row.get(1)?,
            name: row.get(2)?,
            price: row.get(3)?,
            duration_minutes: row.get(4)?,
        })
    })?;

    let mut services = vec![];
    for row in rows {
        services.push(row?);
    }
    Ok(services)
}

fn parse_salon_row(row: &rusqlite::Row) -> anyhow::Result<Salon> {
    let created_at: String = row.get(8)?;
    Ok(Salon {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        address: row.get(3)?,
        description: row.get(4)?,
        image_url: row.get(5)?,
        rating: row.get(6)?,
        review_count: row.get(7)?,
        services: vec![],
        created_at: parse_timestamp(&created_at)?,
    })
}

// ── Bookings ──

pub enum InsertOutcome {
    Inserted,
    SlotTaken,
}

/// Inserts `booking`. A confirmed booking for an already confirmed slot is
/// refused by the `idx_bookings_confirmed_slot` unique index and reported
/// as [`InsertOutcome::SlotTaken`]; the check and the write are one
/// statement, so concurrent writers on other connections cannot both win.
pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<InsertOutcome> {
    let result = conn.execute(
        "INSERT INTO bookings (id, salon_id, service_id, user_id, date, time, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            booking.id,
            booking.salon_id,
            booking.service_id,
            booking.user_id,
            booking.date.format(DATE_FORMAT).to_string(),
            booking.time.format(TIME_FORMAT).to_string(),
            booking.status.as_str(),
            booking.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    );

    match result {
        Ok(_) => Ok(InsertOutcome::Inserted),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Ok(InsertOutcome::SlotTaken)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
pub fn get_confirmed_booking(
    conn: &Connection,
    slot: &crate::models::Slot,
) -> anyhow::Result<Option<Booking>> {
    let booking = conn
        .query_row(
            "SELECT id, salon_id, service_id, user_id, date, time, status, created_at
             FROM bookings
             WHERE salon_id = ?1 AND service_id = ?2 AND date = ?3 AND time = ?4 AND status = 'confirmed'",
            params![
                slot.salon_id,
                slot.service_id,
                slot.date.format(DATE_FORMAT).to_string(),
                slot.time.format(TIME_FORMAT).to_string(),
            ],
            |row| Ok(parse_booking_row(row)),
        )
        .optional()?;
    booking.transpose()
}

/// Chronological: date, then time, then insertion order.
pub fn get_bookings_for_user(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(
        "SELECT id, salon_id, service_id, user_id, date, time, status, created_at
         FROM bookings WHERE user_id = ?1 ORDER BY date ASC, time ASC, rowid ASC",
    )?;

    let rows = stmt.query_map(params![user_id], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

#[cfg(test)]
pub fn count_bookings(conn: &Connection) -> anyhow::Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM bookings", [], |row| row.get(0))?)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let date_str: String = row.get(4)?;
    let time_str: String = row.get(5)?;
    let status_str: String = row.get(6)?;
    let created_at_str: String = row.get(7)?;

    let status = BookingStatus::parse(&status_str)
        .ok_or_else(|| anyhow::anyhow!("unknown booking status in storage: {status_str}"))?;

    Ok(Booking {
        id: row.get(0)?,
        salon_id: row.get(1)?,
        service_id: row.get(2)?,
        user_id: row.get(3)?,
        date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)?,
        time: NaiveTime::parse_from_str(&time_str, TIME_FORMAT)?,
        status,
        created_at: parse_timestamp(&created_at_str)?,
    })
}

fn parse_timestamp(s: &str) -> anyhow::Result<NaiveDateTime> {
    Ok(NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)?)
}
