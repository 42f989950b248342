// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply catalog for end-user facing messages.
//!
//! Every reply the pipeline sends is looked up here by [`MessageKey`] and
//! [`Language`]. A key with no entry for the requested language falls back
//! to English.

use feedbackbot_core::types::Language;

/// Identifies one user-facing reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    Welcome,
    AdminOnlyEmpty,
    EmptyMessage,
    TooLong,
    NoGroups,
    PickGroup,
    FeedbackSent,
    FeedbackSentAdminOnly,
    SessionExpired,
    GroupNotFound,
    UnknownCommand,
    RateLimited,
    UnexpectedError,
}

impl MessageKey {
    /// Every key, in catalog order.
    pub const ALL: [MessageKey; 13] = [
        Self::Welcome,
        Self::AdminOnlyEmpty,
        Self::EmptyMessage,
        Self::TooLong,
        Self::NoGroups,
        Self::PickGroup,
        Self::FeedbackSent,
        Self::FeedbackSentAdminOnly,
        Self::SessionExpired,
        Self::GroupNotFound,
        Self::UnknownCommand,
        Self::RateLimited,
        Self::UnexpectedError,
    ];
}

/// Returns the reply text for `key` in `lang`, falling back to English.
pub fn localize(key: MessageKey, lang: Language) -> &'static str {
    lookup(key, lang)
        .or_else(|| lookup(key, Language::En))
        .unwrap_or_default()
}

fn lookup(key: MessageKey, lang: Language) -> Option<&'static str> {
    match lang {
        Language::En => Some(english(key)),
        Language::Ru => russian(key),
        Language::Uz => uzbek(key),
    }
}

fn english(key: MessageKey) -> &'static str {
    use MessageKey::*;
    match key {
        Welcome => {
            "👋 Welcome to FeedbackBot!\n\n\
             📝 Send me a message and I'll deliver it anonymously to your team admin.\n\n\
             Commands:\n\
             /start — Show this welcome message\n\
             /help — Show available commands\n\
             /adminOnly <message> — Send feedback visible only to admin\n\n\
             💡 Just type your feedback and send!"
        }
        AdminOnlyEmpty => {
            "Please write your feedback after /adminOnly.\n\n\
             Example: /adminOnly I think we should improve our standup meetings."
        }
        EmptyMessage => "Please send a text message with your feedback.",
        TooLong => "✂️ Your message is too long. Please shorten it and send it again.",
        NoGroups => "❌ No active groups found. The bot needs to be added to a group first.",
        PickGroup => "📋 Which group is this feedback for?",
        FeedbackSent => "✅ Your feedback has been submitted anonymously. Thank you!",
        FeedbackSentAdminOnly => {
            "✅ Your feedback has been sent privately to the admin. It will NOT be posted in the group."
        }
        SessionExpired => "⏳ Session expired. Please send your feedback again.",
        GroupNotFound => "❌ Group not found.",
        UnknownCommand => {
            "🤔 Unknown command. Did you mean to send feedback? Just type your message!\n\n\
             Use /help to see available commands."
        }
        RateLimited => {
            "⏰ You've sent too many messages. Please wait a bit before sending more feedback."
        }
        UnexpectedError => "❌ An unexpected error occurred. Please try again.",
    }
}

fn russian(key: MessageKey) -> Option<&'static str> {
    use MessageKey::*;
    let text = match key {
        Welcome => {
            "👋 Добро пожаловать в FeedbackBot!\n\n\
             📝 Отправьте мне сообщение, и я доставлю его анонимно вашему администратору.\n\n\
             Команды:\n\
             /start — Показать приветствие\n\
             /help — Показать команды\n\
             /adminOnly <сообщение> — Отправить отзыв только для админа\n\n\
             💡 Просто напишите ваш отзыв и отправьте!"
        }
        AdminOnlyEmpty => {
            "Пожалуйста, напишите отзыв после /adminOnly.\n\n\
             Пример: /adminOnly Я думаю, нам стоит улучшить наши стендапы."
        }
        EmptyMessage => "Пожалуйста, отправьте текстовое сообщение с вашим отзывом.",
        TooLong => "✂️ Сообщение слишком длинное. Сократите его и отправьте снова.",
        NoGroups => "❌ Активные группы не найдены. Сначала нужно добавить бота в группу.",
        PickGroup => "📋 Для какой группы этот отзыв?",
        FeedbackSent => "✅ Ваш отзыв отправлен анонимно. Спасибо!",
        FeedbackSentAdminOnly => {
            "✅ Ваш отзыв отправлен приватно администратору. Он НЕ будет опубликован в группе."
        }
        SessionExpired => "⏳ Сессия истекла. Пожалуйста, отправьте отзыв заново.",
        GroupNotFound => "❌ Группа не найдена.",
        UnknownCommand => {
            "🤔 Неизвестная команда. Хотели отправить отзыв? Просто напишите сообщение!\n\n\
             Используйте /help для списка команд."
        }
        RateLimited => "⏰ Вы отправили слишком много сообщений. Подождите немного.",
        UnexpectedError => return None,
    };
    Some(text)
}

fn uzbek(key: MessageKey) -> Option<&'static str> {
    use MessageKey::*;
    let text = match key {
        Welcome => {
            "👋 FeedbackBot'ga xush kelibsiz!\n\n\
             📝 Menga xabar yuboring va men uni anonim ravishda administratoringizga yetkazaman.\n\n\
             Buyruqlar:\n\
             /start — Salom xabarini ko'rsatish\n\
             /help — Buyruqlarni ko'rsatish\n\
             /adminOnly <xabar> — Faqat admin uchun fikr yuborish\n\n\
             💡 Fikringizni yozing va yuboring!"
        }
        AdminOnlyEmpty => {
            "/adminOnly dan keyin fikringizni yozing.\n\n\
             Misol: /adminOnly Menimcha, standup yig'ilishlarimizni yaxshilashimiz kerak."
        }
        EmptyMessage => "Iltimos, fikringiz bilan matnli xabar yuboring.",
        NoGroups => "❌ Faol guruhlar topilmadi. Avval botni guruhga qo'shish kerak.",
        PickGroup => "📋 Bu fikr qaysi guruh uchun?",
        FeedbackSent => "✅ Fikringiz anonim ravishda yuborildi. Rahmat!",
        FeedbackSentAdminOnly => {
            "✅ Fikringiz maxfiy ravishda administratorga yuborildi. U guruhda JOYLANMAYDI."
        }
        SessionExpired => "⏳ Sessiya tugadi. Iltimos, fikringizni qaytadan yuboring.",
        GroupNotFound => "❌ Guruh topilmadi.",
        UnknownCommand => {
            "🤔 Noma'lum buyruq. Fikr yubormoqchi edingizmi? Xabaringizni yozing!\n\n\
             /help — buyruqlar ro'yxati."
        }
        RateLimited => "⏰ Juda ko'p xabar yubordingiz. Biroz kuting.",
        TooLong | UnexpectedError => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_has_english_text() {
        for key in MessageKey::ALL {
            assert!(!localize(key, Language::En).is_empty(), "{key:?}");
        }
    }

    #[test]
    fn every_key_resolves_in_every_language() {
        for lang in [Language::En, Language::Ru, Language::Uz] {
            for key in MessageKey::ALL {
                assert!(!localize(key, lang).is_empty(), "{key:?} / {lang}");
            }
        }
    }

    #[test]
    fn translated_keys_use_the_requested_language() {
        assert_eq!(
            localize(MessageKey::GroupNotFound, Language::Ru),
            "❌ Группа не найдена."
        );
        assert_eq!(
            localize(MessageKey::GroupNotFound, Language::Uz),
            "❌ Guruh topilmadi."
        );
    }

    #[test]
    fn missing_translation_falls_back_to_english() {
        assert_eq!(
            localize(MessageKey::TooLong, Language::Uz),
            localize(MessageKey::TooLong, Language::En)
        );
        assert_eq!(
            localize(MessageKey::UnexpectedError, Language::Ru),
            "❌ An unexpected error occurred. Please try again."
        );
    }

    #[test]
    fn welcome_lists_commands() {
        let text = localize(MessageKey::Welcome, Language::En);
        assert!(text.contains("/start"));
        assert!(text.contains("/help"));
        assert!(text.contains("/adminOnly"));
    }
}
