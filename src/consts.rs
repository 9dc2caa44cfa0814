// Страницы
//
// Максимум ключей на странице: 2^10 - 2. Слотов на две больше:
// слот 0 — null-объект для fixup-операций красно-чёрного дерева,
// слот 1 хранит служебные поля (count, голова free-списка, корень).
pub const MAX_KEYS_IN_PAGE: usize = 1022;
pub const SLOTS_IN_PAGE: usize = MAX_KEYS_IN_PAGE + 2;

// Порог "почти полной" страницы: вставка ключа вне [min, max] такой
// страницы открывает новую страницу вместо сплита (минимизирует сплиты
// на частично упорядоченных данных).
pub const ALMOST_FULL_PAGE_SIZE: usize = MAX_KEYS_IN_PAGE - 64;

// Магическое число для проверки целостности страниц (шестнадцатеричные
// цифры числа пи). На записи корневой индекс XOR-ится с ним; на чтении
// верхние 22 бита поля должны совпасть с верхними 22 битами магии.
pub const PAGE_MAGIC: u32 = 0xbb40_e609;

// Файл индекса
//
// Зарезервированный префикс файла: байт 0 — флаг clean-close, байты 1..5 —
// число ключей (LE), байты 5..9 — смещение сериализованного каталога (LE),
// остальное — нули.
pub const HEADER_SIZE: usize = 1024;

// Максимальное значение offset записи.
pub const MAX_OFFSET: i32 = 0x7fff_ffff;

// Кэш страниц
pub const DEFAULT_CACHE_PAGES: usize = 16;
pub const MIN_CACHE_PAGES: usize = 2;
