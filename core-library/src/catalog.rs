//! Static chapter catalog.
//!
//! Names and verse counts for all 114 chapters. Used to validate identifiers
//! and as the fallback when the metadata API cannot be reached.

use bridge_traits::ChapterInfo;

use crate::error::{LibraryError, Result};

/// Number of chapters.
pub const CHAPTER_COUNT: u16 = 114;

/// (transliterated name, Arabic name, meaning, verse count), indexed by id - 1.
const CHAPTERS: [(&str, &str, &str, u16); CHAPTER_COUNT as usize] = [
    ("Al-Fatiha", "الفاتحة", "The Opening", 7),
    ("Al-Baqarah", "البقرة", "The Cow", 286),
    ("Ali 'Imran", "آل عمران", "Family of Imran", 200),
    ("An-Nisa", "النساء", "The Women", 176),
    ("Al-Ma'idah", "المائدة", "The Table Spread", 120),
    ("Al-An'am", "الأنعام", "The Cattle", 165),
    ("Al-A'raf", "الأعراف", "The Heights", 206),
    ("Al-Anfal", "الأنفال", "The Spoils of War", 75),
    ("At-Tawbah", "التوبة", "The Repentance", 129),
    ("Yunus", "يونس", "Jonah", 109),
    ("Hud", "هود", "Hud", 123),
    ("Yusuf", "يوسف", "Joseph", 111),
    ("Ar-Ra'd", "الرعد", "The Thunder", 43),
    ("Ibrahim", "ابراهيم", "Abraham", 52),
    ("Al-Hijr", "الحجر", "The Rocky Tract", 99),
    ("An-Nahl", "النحل", "The Bee", 128),
    ("Al-Isra", "الإسراء", "The Night Journey", 111),
    ("Al-Kahf", "الكهف", "The Cave", 110),
    ("Maryam", "مريم", "Mary", 98),
    ("Taha", "طه", "Ta-Ha", 135),
    ("Al-Anbya", "الأنبياء", "The Prophets", 112),
    ("Al-Hajj", "الحج", "The Pilgrimage", 78),
    ("Al-Mu'minun", "المؤمنون", "The Believers", 118),
    ("An-Nur", "النور", "The Light", 64),
    ("Al-Furqan", "الفرقان", "The Criterion", 77),
    ("Ash-Shu'ara", "الشعراء", "The Poets", 227),
    ("An-Naml", "النمل", "The Ant", 93),
    ("Al-Qasas", "القصص", "The Stories", 88),
    ("Al-'Ankabut", "العنكبوت", "The Spider", 69),
    ("Ar-Rum", "الروم", "The Romans", 60),
    ("Luqman", "لقمان", "Luqman", 34),
    ("As-Sajdah", "السجدة", "The Prostration", 30),
    ("Al-Ahzab", "الأحزاب", "The Combined Forces", 73),
    ("Saba", "سبإ", "Sheba", 54),
    ("Fatir", "فاطر", "Originator", 45),
    ("Ya-Sin", "يس", "Ya Sin", 83),
    ("As-Saffat", "الصافات", "Those who set the Ranks", 182),
    ("Sad", "ص", "The Letter Saad", 88),
    ("Az-Zumar", "الزمر", "The Troops", 75),
    ("Ghafir", "غافر", "The Forgiver", 85),
    ("Fussilat", "فصلت", "Explained in Detail", 54),
    ("Ash-Shuraa", "الشورى", "The Consultation", 53),
    ("Az-Zukhruf", "الزخرف", "The Ornaments of Gold", 89),
    ("Ad-Dukhan", "الدخان", "The Smoke", 59),
    ("Al-Jathiyah", "الجاثية", "The Crouching", 37),
    ("Al-Ahqaf", "الأحقاف", "The Wind-Curved Sandhills", 35),
    ("Muhammad", "محمد", "Muhammad", 38),
    ("Al-Fath", "الفتح", "The Victory", 29),
    ("Al-Hujurat", "الحجرات", "The Rooms", 18),
    ("Qaf", "ق", "The Letter Qaf", 45),
    ("Adh-Dhariyat", "الذاريات", "The Winnowing Winds", 60),
    ("At-Tur", "الطور", "The Mount", 49),
    ("An-Najm", "النجم", "The Star", 62),
    ("Al-Qamar", "القمر", "The Moon", 55),
    ("Ar-Rahman", "الرحمن", "The Beneficent", 78),
    ("Al-Waqi'ah", "الواقعة", "The Inevitable", 96),
    ("Al-Hadid", "الحديد", "The Iron", 29),
    ("Al-Mujadila", "المجادلة", "The Pleading Woman", 22),
    ("Al-Hashr", "الحشر", "The Exile", 24),
    ("Al-Mumtahanah", "الممتحنة", "She that is to be examined", 13),
    ("As-Saf", "الصف", "The Ranks", 14),
    ("Al-Jumu'ah", "الجمعة", "The Congregation", 11),
    ("Al-Munafiqun", "المنافقون", "The Hypocrites", 11),
    ("At-Taghabun", "التغابن", "The Mutual Disillusion", 18),
    ("At-Talaq", "الطلاق", "The Divorce", 12),
    ("At-Tahrim", "التحريم", "The Prohibition", 12),
    ("Al-Mulk", "الملك", "The Sovereignty", 30),
    ("Al-Qalam", "القلم", "The Pen", 52),
    ("Al-Haqqah", "الحاقة", "The Reality", 52),
    ("Al-Ma'arij", "المعارج", "The Ascending Stairways", 44),
    ("Nuh", "نوح", "Noah", 28),
    ("Al-Jinn", "الجن", "The Jinn", 28),
    ("Al-Muzzammil", "المزمل", "The Enshrouded One", 20),
    ("Al-Muddaththir", "المدثر", "The Cloaked One", 56),
    ("Al-Qiyamah", "القيامة", "The Resurrection", 40),
    ("Al-Insan", "الانسان", "The Man", 31),
    ("Al-Mursalat", "المرسلات", "The Emissaries", 50),
    ("An-Naba", "النبإ", "The Tidings", 40),
    ("An-Nazi'at", "النازعات", "Those who drag forth", 46),
    ("'Abasa", "عبس", "He Frowned", 42),
    ("At-Takwir", "التكوير", "The Overthrowing", 29),
    ("Al-Infitar", "الإنفطار", "The Cleaving", 19),
    ("Al-Mutaffifin", "المطففين", "The Defrauding", 36),
    ("Al-Inshiqaq", "الإنشقاق", "The Sundering", 25),
    ("Al-Buruj", "البروج", "The Mansions of the Stars", 22),
    ("At-Tariq", "الطارق", "The Nightcomer", 17),
    ("Al-A'la", "الأعلى", "The Most High", 19),
    ("Al-Ghashiyah", "الغاشية", "The Overwhelming", 26),
    ("Al-Fajr", "الفجر", "The Dawn", 30),
    ("Al-Balad", "البلد", "The City", 20),
    ("Ash-Shams", "الشمس", "The Sun", 15),
    ("Al-Layl", "الليل", "The Night", 21),
    ("Ad-Duhaa", "الضحى", "The Morning Hours", 11),
    ("Ash-Sharh", "الشرح", "The Relief", 8),
    ("At-Tin", "التين", "The Fig", 8),
    ("Al-'Alaq", "العلق", "The Clot", 19),
    ("Al-Qadr", "القدر", "The Power", 5),
    ("Al-Bayyinah", "البينة", "The Clear Proof", 8),
    ("Az-Zalzalah", "الزلزلة", "The Earthquake", 8),
    ("Al-'Adiyat", "العاديات", "The Courser", 11),
    ("Al-Qari'ah", "القارعة", "The Calamity", 11),
    ("At-Takathur", "التكاثر", "The Rivalry in World Increase", 8),
    ("Al-'Asr", "العصر", "The Declining Day", 3),
    ("Al-Humazah", "الهمزة", "The Traducer", 9),
    ("Al-Fil", "الفيل", "The Elephant", 5),
    ("Quraysh", "قريش", "Quraysh", 4),
    ("Al-Ma'un", "الماعون", "The Small Kindnesses", 7),
    ("Al-Kawthar", "الكوثر", "The Abundance", 3),
    ("Al-Kafirun", "الكافرون", "The Disbelievers", 6),
    ("An-Nasr", "النصر", "The Divine Support", 3),
    ("Al-Masad", "المسد", "The Palm Fiber", 5),
    ("Al-Ikhlas", "الإخلاص", "The Sincerity", 4),
    ("Al-Falaq", "الفلق", "The Daybreak", 5),
    ("An-Nas", "الناس", "Mankind", 6),
];

/// Returns an error unless `chapter` is in `1..=114`.
pub fn validate_chapter(chapter: u16) -> Result<()> {
    if (1..=CHAPTER_COUNT).contains(&chapter) {
        Ok(())
    } else {
        Err(LibraryError::InvalidChapter(chapter))
    }
}

/// Returns an error unless `verse` exists in `chapter`.
pub fn validate_verse(chapter: u16, verse: u16) -> Result<()> {
    validate_chapter(chapter)?;
    match verse_count(chapter) {
        Some(count) if (1..=count).contains(&verse) => Ok(()),
        _ => Err(LibraryError::InvalidVerse { chapter, verse }),
    }
}

/// Number of verses in `chapter`.
pub fn verse_count(chapter: u16) -> Option<u16> {
    entry(chapter).map(|(_, _, _, count)| *count)
}

/// Catalog entry for `chapter` as a [`ChapterInfo`].
pub fn chapter_info(chapter: u16) -> Option<ChapterInfo> {
    entry(chapter).map(|(name, arabic, meaning, count)| ChapterInfo {
        id: chapter,
        name: (*name).to_string(),
        name_arabic: (*arabic).to_string(),
        translation: (*meaning).to_string(),
        verse_count: *count,
    })
}

/// All chapter ids in reading order.
pub fn chapter_ids() -> Vec<u16> {
    (1..=CHAPTER_COUNT).collect()
}

fn entry(chapter: u16) -> Option<&'static (&'static str, &'static str, &'static str, u16)> {
    chapter
        .checked_sub(1)
        .and_then(|index| CHAPTERS.get(usize::from(index)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_verse_count() {
        let total: u32 = chapter_ids()
            .into_iter()
            .filter_map(verse_count)
            .map(u32::from)
            .sum();
        assert_eq!(total, 6236);
    }

    #[test]
    fn test_chapter_bounds() {
        assert!(validate_chapter(1).is_ok());
        assert!(validate_chapter(114).is_ok());
        assert!(matches!(
            validate_chapter(0),
            Err(LibraryError::InvalidChapter(0))
        ));
        assert!(validate_chapter(115).is_err());
        assert!(chapter_info(0).is_none());
    }

    #[test]
    fn test_verse_bounds() {
        assert!(validate_verse(2, 286).is_ok());
        assert!(validate_verse(2, 287).is_err());
        assert!(validate_verse(1, 0).is_err());
        assert!(validate_verse(115, 1).is_err());
    }

    #[test]
    fn test_chapter_info_lookup() {
        let info = chapter_info(114).unwrap();
        assert_eq!(info.id, 114);
        assert_eq!(info.name, "An-Nas");
        assert_eq!(info.translation, "Mankind");
        assert_eq!(info.verse_count, 6);
    }

    #[test]
    fn test_chapter_ids_in_reading_order() {
        let ids = chapter_ids();
        assert_eq!(ids.len(), 114);
        assert_eq!(ids.first(), Some(&1));
        assert_eq!(ids.last(), Some(&114));
    }
}
