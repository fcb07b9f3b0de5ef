use serenity::all::{Colour, MessageId, MessageReaction, Permissions, ReactionType, RoleId};

pub const CHECK_MARK: &str = "✅";
pub const MEMBER_ROLE_NAME: &str = "Member";
pub const MEMBER_ROLE_COLOUR: Colour = Colour(0x00FF00);
pub const MOD_ROLE_NAME: &str = "Mod";

pub fn is_check_mark(emoji: &ReactionType) -> bool {
    matches!(emoji, ReactionType::Unicode(name) if name == CHECK_MARK)
}

/// Whether a reaction on `message_id` should toggle the Member role.
pub fn is_rules_verification(
    rules_message: Option<MessageId>,
    message_id: MessageId,
    emoji: &ReactionType,
    user_is_bot: bool,
) -> bool {
    !user_is_bot && rules_message == Some(message_id) && is_check_mark(emoji)
}

/// Configured Member role if the guild still has it, otherwise the role named
/// `Member`. `roles` are the guild's `(id, name)` pairs.
pub fn select_member_role<'a>(
    configured: Option<RoleId>,
    roles: impl IntoIterator<Item = (RoleId, &'a str)>,
) -> Option<RoleId> {
    let roles: Vec<(RoleId, &str)> = roles.into_iter().collect();

    configured
        .filter(|id| roles.iter().any(|(role_id, _)| role_id == id))
        .or_else(|| {
            roles
                .iter()
                .find(|(_, name)| *name == MEMBER_ROLE_NAME)
                .map(|(id, _)| *id)
        })
}

/// Whether the bot still has to add its own ✅ to the rules message.
pub fn needs_check_mark(reactions: &[MessageReaction]) -> bool {
    !reactions
        .iter()
        .any(|r| r.me && is_check_mark(&r.reaction_type))
}

/// @everyone cannot see the welcome channel; members can read but not post.
pub fn welcome_channel_permissions() -> (Permissions, (Permissions, Permissions)) {
    let everyone_deny = Permissions::VIEW_CHANNEL;
    let member_allow = Permissions::VIEW_CHANNEL | Permissions::READ_MESSAGE_HISTORY;
    let member_deny = Permissions::SEND_MESSAGES;
    (everyone_deny, (member_allow, member_deny))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check() -> ReactionType {
        ReactionType::Unicode(CHECK_MARK.to_string())
    }

    #[test]
    fn test_check_on_rules_message_counts() {
        let rules = MessageId::new(1345443188956987504);
        assert!(is_rules_verification(Some(rules), rules, &check(), false));
    }

    #[test]
    fn test_other_reactions_are_ignored() {
        let rules = MessageId::new(42);
        let other = MessageId::new(43);
        let thumbs = ReactionType::Unicode("👍".to_string());

        assert!(!is_rules_verification(Some(rules), other, &check(), false));
        assert!(!is_rules_verification(Some(rules), rules, &thumbs, false));
        assert!(!is_rules_verification(Some(rules), rules, &check(), true));
        assert!(!is_rules_verification(None, rules, &check(), false));
    }

    #[test]
    fn test_configured_member_role_is_used_when_present() {
        let configured = RoleId::new(7);
        let roles = [(RoleId::new(7), "Verified"), (RoleId::new(8), "Member")];

        assert_eq!(select_member_role(Some(configured), roles), Some(configured));
    }

    #[test]
    fn test_stale_member_role_falls_back_to_name() {
        let roles = [(RoleId::new(8), "Member"), (RoleId::new(9), "Mod")];

        assert_eq!(
            select_member_role(Some(RoleId::new(7)), roles),
            Some(RoleId::new(8))
        );
        assert_eq!(select_member_role(None, roles), Some(RoleId::new(8)));
        assert_eq!(
            select_member_role(Some(RoleId::new(7)), [(RoleId::new(9), "Mod")]),
            None
        );
    }

    #[test]
    fn test_welcome_permissions() {
        let (everyone_deny, (member_allow, member_deny)) = welcome_channel_permissions();

        assert!(everyone_deny.view_channel());
        assert!(member_allow.view_channel() && member_allow.read_message_history());
        assert!(member_deny.send_messages());
        assert!(!member_allow.send_messages());
    }
}
