use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::Utc;
use uuid::Uuid;

use greenlands_types::api::{
    ChannelFilter, Claims, SendMessageRequest, ThreadSummary, UnreadCount, UserProfile,
};
use greenlands_types::models::{ChannelType, Message};

use crate::access::messaging_candidate_roles;
use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;

/// SendMessage. A new thread gets a fresh v4 thread id (collision-resistant
/// under concurrent sends, unlike a timestamp scheme) and its channel type
/// is validated against the sender/recipient role pair. A reply inherits the
/// thread's channel type regardless of what the client supplied.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let subject = req.subject.trim().to_string();
    if subject.is_empty() {
        return Err(ApiError::Validation("Subject is required".into()));
    }
    if req.content.trim().is_empty() {
        return Err(ApiError::Validation("Content is required".into()));
    }

    let db = state.clone();
    let rid = req.recipient_id.to_string();
    let recipient = blocking(move || db.db.get_user_by_id(&rid))
        .await?
        .ok_or(ApiError::NotFound("Recipient"))?
        .into_user()?;

    // Candidate-set enforcement: the recipient selector is not just a UI
    // convenience, the server rejects out-of-set recipients too.
    if !recipient.active || !messaging_candidate_roles(claims.role).contains(&recipient.role) {
        return Err(ApiError::Forbidden);
    }

    let (thread_id, channel_type) = match req.thread_id {
        Some(thread_id) => {
            let db = state.clone();
            let tid = thread_id.to_string();
            let channel_type = blocking(move || db.db.thread_channel_type(&tid))
                .await?
                .ok_or_else(|| ApiError::Validation("Thread not found".into()))?;
            (thread_id, channel_type)
        }
        None => (
            Uuid::new_v4(),
            req.channel_type.unwrap_or(ChannelType::General),
        ),
    };

    // Every message in a thread honors the channel's role pair, replies
    // included: inheriting a government-farmer type must not let a farmer
    // address another farmer inside that thread.
    if !channel_type.permits(claims.role, recipient.role) {
        return Err(ApiError::Validation(format!(
            "Channel type '{}' is not valid for a {} messaging a {}",
            channel_type, claims.role, recipient.role
        )));
    }

    let message_id = Uuid::new_v4();
    let new_message = greenlands_db::models::NewMessage {
        id: message_id.to_string(),
        sender_id: claims.sub.to_string(),
        recipient_id: recipient.id.to_string(),
        subject,
        content: req.content,
        thread_id: thread_id.to_string(),
        channel_type: channel_type.as_str().to_string(),
        created_at: Utc::now().to_rfc3339(),
    };

    let db = state.clone();
    let mid = message_id.to_string();
    let message = blocking(move || {
        db.db.insert_message(&new_message)?;
        db.db
            .get_message(&mid)?
            .ok_or_else(|| anyhow::anyhow!("message vanished after insert"))
    })
    .await?
    .into_message()?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// Inbox view: every message the caller sent or received, newest first.
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<ChannelFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let uid = claims.sub.to_string();
    let rows = blocking(move || db.db.list_messages_for_user(&uid, filter.channel_type)).await?;

    let messages = rows
        .into_iter()
        .map(|r| r.into_message())
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(messages))
}

/// Conversation list: the inbox grouped by thread id. Pure read-time
/// projection over the message log.
pub async fn list_threads(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<ChannelFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let uid = claims.sub.to_string();
    let rows = blocking(move || db.db.list_messages_for_user(&uid, filter.channel_type)).await?;

    let messages = rows
        .into_iter()
        .map(|r| r.into_message())
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(summarize_threads(&messages, claims.sub)))
}

/// Returns the thread oldest-first and, as a side effect, marks every
/// message in it addressed to the caller as read. The mark is one atomic
/// UPDATE and happens after the fetch, so the response shows the pre-read
/// state (matching what the client rendered as unread).
pub async fn get_thread(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(thread_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let tid = thread_id.to_string();
    let uid = claims.sub.to_string();
    let rows = blocking(move || {
        let rows = db.db.thread_messages(&tid)?;
        db.db.mark_thread_read(&tid, &uid)?;
        Ok(rows)
    })
    .await?;

    let messages = rows
        .into_iter()
        .map(|r| r.into_message())
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(messages))
}

pub async fn unread_count(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<ChannelFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let uid = claims.sub.to_string();
    let count = blocking(move || db.db.unread_count(&uid, filter.channel_type)).await?;

    Ok(Json(UnreadCount { count }))
}

/// Messaging candidates for the composition UI; the same set is enforced in
/// send_message.
pub async fn messaging_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let roles = messaging_candidate_roles(claims.role);
    let db = state.clone();
    let rows = blocking(move || db.db.list_active_users_by_roles(roles)).await?;

    let users = rows
        .into_iter()
        .map(|r| r.into_user().map(|u| UserProfile::from(&u)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(users))
}

/// Group messages (assumed newest-first) into per-thread summaries, keeping
/// the newest-activity-first ordering. Subject and participants come from
/// the earliest message of each thread; `unread` is true iff any message in
/// the thread is addressed to the viewer and still unread.
fn summarize_threads(messages: &[Message], viewer: Uuid) -> Vec<ThreadSummary> {
    let mut order: Vec<Uuid> = Vec::new();
    let mut groups: HashMap<Uuid, Vec<&Message>> = HashMap::new();

    for message in messages {
        let group = groups.entry(message.thread_id).or_default();
        if group.is_empty() {
            order.push(message.thread_id);
        }
        group.push(message);
    }

    order
        .into_iter()
        .filter_map(|thread_id| {
            let group = groups.get(&thread_id)?;
            // Newest-first input: last element is the thread opener
            let earliest = *group.last()?;
            let latest = *group.first()?;
            let unread = group
                .iter()
                .any(|m| m.recipient.id == viewer && !m.read);

            Some(ThreadSummary {
                thread_id,
                subject: earliest.subject.clone(),
                channel_type: earliest.channel_type,
                participants: vec![earliest.sender.clone(), earliest.recipient.clone()],
                last_message: latest.clone(),
                unread,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use greenlands_db::Database;
    use greenlands_types::models::{MessageParty, Role, User};

    use crate::auth::AppStateInner;
    use crate::notify::NoopNotifier;

    fn party(name: &str, role: Role) -> MessageParty {
        MessageParty {
            id: Uuid::new_v4(),
            name: name.into(),
            email: format!("{}@example.com", name),
            role,
        }
    }

    fn message(
        sender: &MessageParty,
        recipient: &MessageParty,
        subject: &str,
        thread_id: Uuid,
        read: bool,
        minutes: i64,
    ) -> Message {
        Message {
            id: Uuid::new_v4(),
            sender: sender.clone(),
            recipient: recipient.clone(),
            subject: subject.into(),
            content: "body".into(),
            thread_id,
            channel_type: ChannelType::GovernmentFarmer,
            read,
            created_at: chrono::DateTime::from_timestamp(minutes * 60, 0).unwrap(),
        }
    }

    #[test]
    fn threads_keep_subject_of_first_message() {
        let farmer = party("fatuma", Role::Farmer);
        let gov = party("wanjiru", Role::Government);
        let thread = Uuid::new_v4();

        // Newest first, like the inbox query returns
        let messages = vec![
            message(&gov, &farmer, "Re: Subsidy Query", thread, false, 10),
            message(&farmer, &gov, "Subsidy Query", thread, true, 5),
        ];

        let threads = summarize_threads(&messages, farmer.id);
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].subject, "Subsidy Query");
        assert_eq!(threads[0].last_message.subject, "Re: Subsidy Query");
        assert_eq!(
            threads[0].participants,
            vec![farmer.clone(), gov.clone()]
        );
    }

    #[test]
    fn unread_is_per_viewer() {
        let farmer = party("fatuma", Role::Farmer);
        let gov = party("wanjiru", Role::Government);
        let thread = Uuid::new_v4();

        let messages = vec![message(&farmer, &gov, "Subsidy Query", thread, false, 0)];

        // Unread for the recipient...
        let gov_view = summarize_threads(&messages, gov.id);
        assert!(gov_view[0].unread);
        // ...but not for the sender, whose copy is implicitly read
        let farmer_view = summarize_threads(&messages, farmer.id);
        assert!(!farmer_view[0].unread);
    }

    #[test]
    fn threads_ordered_by_latest_activity() {
        let a = party("a", Role::Farmer);
        let b = party("b", Role::Farmer);
        let t1 = Uuid::new_v4();
        let t2 = Uuid::new_v4();

        let messages = vec![
            message(&a, &b, "newer thread", t2, false, 30),
            message(&b, &a, "older thread reply", t1, false, 20),
            message(&a, &b, "older thread", t1, false, 10),
        ];

        let threads = summarize_threads(&messages, a.id);
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].thread_id, t2);
        assert_eq!(threads[1].thread_id, t1);
        assert_eq!(threads[1].subject, "older thread");
    }

    fn test_state() -> AppState {
        Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            jwt_secret: "test-secret".into(),
            notifier: Arc::new(NoopNotifier),
        })
    }

    fn seed_user(state: &AppState, name: &str, role: Role, active: bool) -> Claims {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role,
            location: None,
            farm_size: None,
            department: None,
            phone: None,
            active,
            created_at: now,
            updated_at: now,
        };
        state.db.create_user(&user, "not-a-real-hash").unwrap();
        Claims {
            sub: user.id,
            name: user.name,
            role,
            exp: 0,
        }
    }

    async fn send(
        state: &AppState,
        sender: &Claims,
        recipient: Uuid,
        channel_type: Option<ChannelType>,
        thread_id: Option<Uuid>,
    ) -> Result<(), ApiError> {
        send_message(
            State(state.clone()),
            Extension(sender.clone()),
            Json(SendMessageRequest {
                recipient_id: recipient,
                subject: "Water allocation".into(),
                content: "See attached schedule".into(),
                channel_type,
                thread_id,
            }),
        )
        .await
        .map(|_| ())
    }

    #[tokio::test]
    async fn new_thread_channel_type_must_fit_role_pair() {
        let state = test_state();
        let farmer = seed_user(&state, "Fatuma", Role::Farmer, true);
        let other = seed_user(&state, "Ines", Role::Farmer, true);

        let result = send(
            &state,
            &farmer,
            other.sub,
            Some(ChannelType::GovernmentFarmer),
            None,
        )
        .await;
        assert!(matches!(result, Err(ApiError::Validation(_))));

        // The same pair is fine on a channel that matches their roles
        let result = send(
            &state,
            &farmer,
            other.sub,
            Some(ChannelType::FarmerFarmer),
            None,
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn reply_cannot_widen_thread_role_pair() {
        let state = test_state();
        let gov = seed_user(&state, "Wanjiru", Role::Government, true);
        let farmer = seed_user(&state, "Fatuma", Role::Farmer, true);
        let other_farmer = seed_user(&state, "Ines", Role::Farmer, true);

        send(
            &state,
            &gov,
            farmer.sub,
            Some(ChannelType::GovernmentFarmer),
            None,
        )
        .await
        .unwrap();
        let thread_id = state
            .db
            .list_messages_for_user(&farmer.sub.to_string(), None)
            .unwrap()
            .into_iter()
            .next()
            .unwrap()
            .into_message()
            .unwrap()
            .thread_id;

        // A farmer replying to the government stays inside the pair
        let result = send(&state, &farmer, gov.sub, None, Some(thread_id)).await;
        assert!(result.is_ok());

        // Addressing another farmer under the inherited government-farmer
        // type does not
        let result = send(&state, &farmer, other_farmer.sub, None, Some(thread_id)).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn reply_into_unknown_thread_is_rejected() {
        let state = test_state();
        let farmer = seed_user(&state, "Fatuma", Role::Farmer, true);
        let other = seed_user(&state, "Ines", Role::Farmer, true);

        let result = send(&state, &farmer, other.sub, None, Some(Uuid::new_v4())).await;
        assert!(matches!(result, Err(ApiError::Validation(msg)) if msg == "Thread not found"));
    }

    #[tokio::test]
    async fn unknown_recipient_is_not_found() {
        let state = test_state();
        let farmer = seed_user(&state, "Fatuma", Role::Farmer, true);

        let result = send(&state, &farmer, Uuid::new_v4(), None, None).await;
        assert!(matches!(result, Err(ApiError::NotFound("Recipient"))));
    }

    #[tokio::test]
    async fn recipients_outside_candidate_set_are_forbidden() {
        let state = test_state();
        let farmer = seed_user(&state, "Fatuma", Role::Farmer, true);
        let admin = seed_user(&state, "Root", Role::Admin, true);
        let inactive = seed_user(&state, "Gone", Role::Farmer, false);

        let result = send(&state, &farmer, admin.sub, None, None).await;
        assert!(matches!(result, Err(ApiError::Forbidden)));

        let result = send(&state, &farmer, inactive.sub, None, None).await;
        assert!(matches!(result, Err(ApiError::Forbidden)));
    }
}
