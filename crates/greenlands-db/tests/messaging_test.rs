//! Integration test: run a farmer/government conversation through an
//! in-memory store and verify threading, ordering and read tracking.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use greenlands_db::Database;
use greenlands_db::models::NewMessage;
use greenlands_types::models::{ChannelType, Role, User};

fn seed_user(db: &Database, name: &str, role: Role) -> Uuid {
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        role,
        location: None,
        farm_size: if role == Role::Farmer { Some(12.5) } else { None },
        department: if role == Role::Government {
            Some("Agriculture".to_string())
        } else {
            None
        },
        phone: None,
        active: true,
        created_at: now,
        updated_at: now,
    };
    db.create_user(&user, "not-a-real-hash").unwrap();
    user.id
}

fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

fn send(
    db: &Database,
    sender: Uuid,
    recipient: Uuid,
    subject: &str,
    content: &str,
    thread_id: Uuid,
    channel_type: ChannelType,
    created_at: DateTime<Utc>,
) -> Uuid {
    let id = Uuid::new_v4();
    db.insert_message(&NewMessage {
        id: id.to_string(),
        sender_id: sender.to_string(),
        recipient_id: recipient.to_string(),
        subject: subject.to_string(),
        content: content.to_string(),
        thread_id: thread_id.to_string(),
        channel_type: channel_type.as_str().to_string(),
        created_at: created_at.to_rfc3339(),
    })
    .unwrap();
    id
}

#[test]
fn conversation_threads_and_read_tracking() {
    let db = Database::open_in_memory().unwrap();

    let alice = seed_user(&db, "Alice", Role::Farmer);
    let greta = seed_user(&db, "Greta", Role::Government);

    let thread = Uuid::new_v4();
    send(
        &db,
        alice,
        greta,
        "Irrigation permit",
        "Can I extend my permit?",
        thread,
        ChannelType::GovernmentFarmer,
        at("2026-03-01T09:00:00Z"),
    );
    send(
        &db,
        greta,
        alice,
        "Re: Irrigation permit",
        "Yes, send the parcel id.",
        thread,
        ChannelType::GovernmentFarmer,
        at("2026-03-01T10:00:00Z"),
    );
    send(
        &db,
        alice,
        greta,
        "Re: Irrigation permit",
        "Parcel 42, thanks.",
        thread,
        ChannelType::GovernmentFarmer,
        at("2026-03-01T11:00:00Z"),
    );

    // Conversation reads oldest first
    let msgs = db.thread_messages(&thread.to_string()).unwrap();
    assert_eq!(msgs.len(), 3);
    assert_eq!(msgs[0].content, "Can I extend my permit?");
    assert_eq!(msgs[2].content, "Parcel 42, thanks.");

    // The reply inherits the thread's channel type
    assert_eq!(
        db.thread_channel_type(&thread.to_string()).unwrap(),
        Some(ChannelType::GovernmentFarmer)
    );

    // Unread is counted per viewer: Greta has two incoming, Alice one
    assert_eq!(db.unread_count(&greta.to_string(), None).unwrap(), 2);
    assert_eq!(db.unread_count(&alice.to_string(), None).unwrap(), 1);

    // Greta opens the thread: only her incoming messages flip
    let flipped = db
        .mark_thread_read(&thread.to_string(), &greta.to_string())
        .unwrap();
    assert_eq!(flipped, 2);
    assert_eq!(db.unread_count(&greta.to_string(), None).unwrap(), 0);
    assert_eq!(db.unread_count(&alice.to_string(), None).unwrap(), 1);

    // Opening again is a no-op
    let flipped = db
        .mark_thread_read(&thread.to_string(), &greta.to_string())
        .unwrap();
    assert_eq!(flipped, 0);
}

#[test]
fn inbox_is_newest_first_and_filters_by_channel() {
    let db = Database::open_in_memory().unwrap();

    let alice = seed_user(&db, "Alice", Role::Farmer);
    let bob = seed_user(&db, "Bob", Role::Farmer);
    let greta = seed_user(&db, "Greta", Role::Government);

    send(
        &db,
        bob,
        alice,
        "Seed swap",
        "Trading barley for oats?",
        Uuid::new_v4(),
        ChannelType::FarmerFarmer,
        at("2026-03-02T08:00:00Z"),
    );
    send(
        &db,
        greta,
        alice,
        "Subsidy deadline",
        "Applications close Friday.",
        Uuid::new_v4(),
        ChannelType::GovernmentFarmer,
        at("2026-03-02T09:00:00Z"),
    );

    let inbox = db.list_messages_for_user(&alice.to_string(), None).unwrap();
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0].subject, "Subsidy deadline");
    assert_eq!(inbox[1].subject, "Seed swap");

    let farmer_only = db
        .list_messages_for_user(&alice.to_string(), Some(ChannelType::FarmerFarmer))
        .unwrap();
    assert_eq!(farmer_only.len(), 1);
    assert_eq!(farmer_only[0].subject, "Seed swap");

    // Bob never received anything
    assert_eq!(db.unread_count(&bob.to_string(), None).unwrap(), 0);

    // Channel-filtered unread
    assert_eq!(
        db.unread_count(&alice.to_string(), Some(ChannelType::GovernmentFarmer))
            .unwrap(),
        1
    );
}

#[test]
fn empty_thread_has_no_channel_type() {
    let db = Database::open_in_memory().unwrap();

    let unknown = Uuid::new_v4();
    assert_eq!(db.thread_channel_type(&unknown.to_string()).unwrap(), None);
    assert!(db.thread_messages(&unknown.to_string()).unwrap().is_empty());
}

#[test]
fn messaging_candidates_follow_role_and_active_flag() {
    let db = Database::open_in_memory().unwrap();

    seed_user(&db, "Alice", Role::Farmer);
    seed_user(&db, "Bob", Role::Farmer);
    seed_user(&db, "Greta", Role::Government);

    let farmers_view = db
        .list_active_users_by_roles(&[Role::Government, Role::Farmer])
        .unwrap();
    assert_eq!(farmers_view.len(), 3);

    let gov_only = db.list_active_users_by_roles(&[Role::Government]).unwrap();
    assert_eq!(gov_only.len(), 1);
    assert_eq!(gov_only[0].name, "Greta");

    assert!(db.list_active_users_by_roles(&[]).unwrap().is_empty());
}
