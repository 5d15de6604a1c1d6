use serde::Serialize;

use crate::{
    error::AppError,
    models::{collaborator::TripCollaborator, friendship::Friendship, friendship::LinkStatus},
};

pub fn check_friend_request(
    sender_uuid: &str,
    receiver_uuid: &str,
    existing: Option<&Friendship>,
) -> Result<(), AppError> {
    if sender_uuid == receiver_uuid {
        return Err(AppError::BadRequest(
            "you cannot send a friend request to yourself".into(),
        ));
    }
    match existing {
        Some(friendship) if friendship.status == LinkStatus::Accepted => {
            Err(AppError::Conflict("you are already friends".into()))
        }
        Some(_) => Err(AppError::Conflict("a friend request is already pending".into())),
        None => Ok(()),
    }
}

pub fn accept_friendship(friendship: &Friendship, actor_uuid: &str) -> Result<LinkStatus, AppError> {
    if friendship.receiver_id != actor_uuid {
        return Err(AppError::Forbidden);
    }
    if friendship.status != LinkStatus::Pending {
        return Err(AppError::Conflict("friend request was already accepted".into()));
    }
    Ok(LinkStatus::Accepted)
}

pub fn check_friendship_removal(friendship: &Friendship, actor_uuid: &str) -> Result<(), AppError> {
    if friendship.involves(actor_uuid) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

pub fn check_invite(
    trip_owner: &str,
    actor_uuid: &str,
    invitee_uuid: &str,
    are_friends: bool,
    existing: Option<&TripCollaborator>,
) -> Result<(), AppError> {
    if trip_owner != actor_uuid {
        return Err(AppError::Forbidden);
    }
    if invitee_uuid == trip_owner {
        return Err(AppError::BadRequest("the owner is already part of the trip".into()));
    }
    if !are_friends {
        return Err(AppError::BadRequest("only friends can be invited".into()));
    }
    if existing.is_some() {
        return Err(AppError::Conflict("user is already invited to this trip".into()));
    }
    Ok(())
}

pub fn accept_invite(collaborator: &TripCollaborator, actor_uuid: &str) -> Result<LinkStatus, AppError> {
    if collaborator.user_id != actor_uuid {
        return Err(AppError::Forbidden);
    }
    if collaborator.status != LinkStatus::Pending {
        return Err(AppError::Conflict("invitation was already accepted".into()));
    }
    Ok(LinkStatus::Accepted)
}

/// How a collaborator row disappeared. A client closes the trip and goes back
/// to the dashboard after `Left`, and refreshes the member list after
/// `Kicked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalOutcome {
    Left,
    Kicked,
}

pub fn resolve_removal(
    trip_owner: &str,
    subject_uuid: &str,
    actor_uuid: &str,
) -> Result<RemovalOutcome, AppError> {
    if actor_uuid == subject_uuid {
        Ok(RemovalOutcome::Left)
    } else if actor_uuid == trip_owner && subject_uuid != trip_owner {
        Ok(RemovalOutcome::Kicked)
    } else {
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn friendship(status: LinkStatus) -> Friendship {
        Friendship {
            id: "f1".into(),
            sender_id: "alice".into(),
            receiver_id: "bob".into(),
            status,
            created_at: Utc::now(),
        }
    }

    fn collaborator(status: LinkStatus) -> TripCollaborator {
        TripCollaborator {
            id: "c1".into(),
            trip_id: "t1".into(),
            user_id: "bob".into(),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn self_and_duplicate_requests_are_refused() {
        assert!(matches!(
            check_friend_request("alice", "alice", None),
            Err(AppError::BadRequest(_))
        ));
        let pending = friendship(LinkStatus::Pending);
        assert!(matches!(
            check_friend_request("bob", "alice", Some(&pending)),
            Err(AppError::Conflict(_))
        ));
        assert!(check_friend_request("alice", "carol", None).is_ok());
    }

    #[test]
    fn only_receiver_accepts_pending_request() {
        let pending = friendship(LinkStatus::Pending);
        assert!(matches!(accept_friendship(&pending, "alice"), Err(AppError::Forbidden)));
        assert_eq!(accept_friendship(&pending, "bob").unwrap(), LinkStatus::Accepted);
        let accepted = friendship(LinkStatus::Accepted);
        assert!(accept_friendship(&accepted, "bob").is_err());
    }

    #[test]
    fn either_party_removes_friendship() {
        let accepted = friendship(LinkStatus::Accepted);
        assert!(check_friendship_removal(&accepted, "alice").is_ok());
        assert!(check_friendship_removal(&accepted, "bob").is_ok());
        assert!(check_friendship_removal(&accepted, "mallory").is_err());
    }

    #[test]
    fn invites_need_owner_and_friendship() {
        assert!(matches!(
            check_invite("alice", "bob", "carol", true, None),
            Err(AppError::Forbidden)
        ));
        assert!(check_invite("alice", "alice", "bob", false, None).is_err());
        let existing = collaborator(LinkStatus::Pending);
        assert!(matches!(
            check_invite("alice", "alice", "bob", true, Some(&existing)),
            Err(AppError::Conflict(_))
        ));
        assert!(check_invite("alice", "alice", "bob", true, None).is_ok());
    }

    #[test]
    fn invitee_accepts_own_invite() {
        let pending = collaborator(LinkStatus::Pending);
        assert!(accept_invite(&pending, "alice").is_err());
        assert_eq!(accept_invite(&pending, "bob").unwrap(), LinkStatus::Accepted);
    }

    #[test]
    fn removal_routes_to_leave_or_kick() {
        assert_eq!(resolve_removal("alice", "bob", "bob").unwrap(), RemovalOutcome::Left);
        assert_eq!(resolve_removal("alice", "bob", "alice").unwrap(), RemovalOutcome::Kicked);
        assert!(matches!(
            resolve_removal("alice", "bob", "carol"),
            Err(AppError::Forbidden)
        ));
    }
}
