//! English messages

use super::*;

/// Get English message
pub fn get(key: &str) -> &'static str {
    match key {
        WELCOME => "Hi! Send me an image made with Gemini and I will remove the watermark.\n\n\
            Single photos, albums, image files and ZIP archives are all fine. See /help for details.",
        HELP => "*How to use*\n\n\
            • Send a photo or an image file and get back a cleaned preview plus a full\\-resolution PNG\\.\n\
            • Send an album to clean several images at once\\.\n\
            • Send a ZIP archive of images to get a cleaned archive back\\.\n\
            • /history lets you download recent results again\\.\n\
            • Type my username in any chat to share a recent result\\.\n\n\
            Daily limit: *{limit}* images\\.",
        HISTORY_EMPTY => "You have not processed any images yet.",
        HISTORY_TITLE => "Your last {count} results. Tap one to download it again:",
        RATE_LIMIT_REACHED => "Daily limit reached ({limit} images per day). Please come back tomorrow.",
        PROCESSING => "Removing watermark...",
        PROCESSING_BATCH => "Processing {count} images...",
        PROCESSING_ZIP => "Found {count} images in the archive, processing...",
        PROGRESS => "Processing {current}/{total}...",
        DONE_BATCH => "Done: {success} of {total} images processed.",
        ZIP_DONE => "Done: {success} of {total} images from the archive processed.",
        NOT_AN_IMAGE => "This file is not an image.",
        NOT_A_ZIP => "Could not read this ZIP archive.",
        ZIP_NO_IMAGES => "No images found in the archive.",
        ERROR => "Something went wrong while processing the image. Please try again.",
        INLINE_OPEN_BOT => "Open the bot to clean images",
        _ => "",
    }
}
