//! Named wrappers for common remote methods.
//!
//! Each wrapper only fixes the method name; parameters and options pass
//! through to [`Client::dispatch`] unchanged. Methods without a wrapper are
//! reachable through [`Client::call`].

use crate::{Client, DispatchError, DispatchRequest, DispatchResult, InvocationSpec, OptionOverrides};

macro_rules! api_methods {
    ($($(#[$meta:meta])* $fn_name:ident => $remote:literal;)+) => {
        /// Remote names of every wrapped method.
        pub const METHOD_NAMES: &[&str] = &[$($remote),+];

        impl Client {
            $(
                $(#[$meta])*
                #[doc = concat!("Invoke `", $remote, "`.")]
                pub async fn $fn_name(
                    &self,
                    params: impl Into<InvocationSpec>,
                    overrides: OptionOverrides,
                ) -> Result<DispatchResult, DispatchError> {
                    self.dispatch(
                        DispatchRequest::new($remote, params.into()).with_overrides(overrides),
                    )
                    .await
                }
            )+
        }
    };
}

api_methods! {
    get_me => "getMe";
    log_out => "logOut";
    close => "close";
    get_updates => "getUpdates";
    set_webhook => "setWebhook";
    delete_webhook => "deleteWebhook";
    get_webhook_info => "getWebhookInfo";

    send_message => "sendMessage";
    forward_message => "forwardMessage";
    copy_message => "copyMessage";
    send_photo => "sendPhoto";
    send_audio => "sendAudio";
    send_document => "sendDocument";
    send_video => "sendVideo";
    send_animation => "sendAnimation";
    send_voice => "sendVoice";
    send_video_note => "sendVideoNote";
    send_media_group => "sendMediaGroup";
    send_location => "sendLocation";
    send_venue => "sendVenue";
    send_contact => "sendContact";
    send_poll => "sendPoll";
    send_dice => "sendDice";
    send_chat_action => "sendChatAction";

    edit_message_text => "editMessageText";
    edit_message_caption => "editMessageCaption";
    edit_message_reply_markup => "editMessageReplyMarkup";
    stop_poll => "stopPoll";
    delete_message => "deleteMessage";

    get_file => "getFile";
    get_user_profile_photos => "getUserProfilePhotos";
    get_chat => "getChat";
    get_chat_administrators => "getChatAdministrators";
    get_chat_member_count => "getChatMemberCount";
    get_chat_member => "getChatMember";
    leave_chat => "leaveChat";
    ban_chat_member => "banChatMember";
    unban_chat_member => "unbanChatMember";
    restrict_chat_member => "restrictChatMember";
    promote_chat_member => "promoteChatMember";
    approve_chat_join_request => "approveChatJoinRequest";
    decline_chat_join_request => "declineChatJoinRequest";
    pin_chat_message => "pinChatMessage";
    unpin_chat_message => "unpinChatMessage";
    set_chat_title => "setChatTitle";
    set_chat_description => "setChatDescription";
    export_chat_invite_link => "exportChatInviteLink";
    set_my_commands => "setMyCommands";

    /// Must be answered for every callback query, even with no text.
    answer_callback_query => "answerCallbackQuery";
    answer_inline_query => "answerInlineQuery";
    answer_shipping_query => "answerShippingQuery";
    answer_pre_checkout_query => "answerPreCheckoutQuery";
}
