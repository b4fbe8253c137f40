//! Russian messages

use super::*;

/// Get Russian message
pub fn get(key: &str) -> &'static str {
    match key {
        WELCOME => "Привет! Пришлите изображение, созданное в Gemini, и я уберу водяной знак.\n\n\
            Подойдут фото, альбомы, файлы изображений и ZIP-архивы. Подробности в /help.",
        HELP => "*Как пользоваться*\n\n\
            • Отправьте фото или файл изображения: в ответ придёт превью и PNG в полном разрешении\\.\n\
            • Отправьте альбом, чтобы обработать несколько изображений сразу\\.\n\
            • Отправьте ZIP\\-архив с изображениями и получите очищенный архив\\.\n\
            • /history позволяет снова скачать недавние результаты\\.\n\
            • Наберите моё имя в любом чате, чтобы поделиться недавним результатом\\.\n\n\
            Дневной лимит: *{limit}* изображений\\.",
        HISTORY_EMPTY => "Вы ещё не обработали ни одного изображения.",
        HISTORY_TITLE => "Ваши последние результаты ({count}). Нажмите, чтобы скачать снова:",
        RATE_LIMIT_REACHED => "Дневной лимит исчерпан ({limit} изображений в день). Возвращайтесь завтра.",
        PROCESSING => "Убираю водяной знак...",
        PROCESSING_BATCH => "Обрабатываю изображения: {count}...",
        PROCESSING_ZIP => "В архиве найдено изображений: {count}, обрабатываю...",
        PROGRESS => "Обработка {current}/{total}...",
        DONE_BATCH => "Готово: обработано {success} из {total}.",
        ZIP_DONE => "Готово: из архива обработано {success} из {total}.",
        NOT_AN_IMAGE => "Этот файл не является изображением.",
        NOT_A_ZIP => "Не удалось прочитать ZIP-архив.",
        ZIP_NO_IMAGES => "В архиве нет изображений.",
        ERROR => "Не удалось обработать изображение. Попробуйте ещё раз.",
        INLINE_OPEN_BOT => "Открыть бота, чтобы очистить изображения",
        _ => "",
    }
}
