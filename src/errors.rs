//! Различимые виды ошибок движка.
//!
//! Политика: публичные API возвращают `anyhow::Result`; перечисленные здесь
//! варианты — те случаи, которые вызывающий код должен уметь отличать
//! (downcast_ref). Ошибки ввода-вывода идут как обёрнутый `std::io::Error`
//! с контекстом.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    /// Обход страницы посетил больше ключей, чем она декларирует, либо
    /// кэш и каталог разошлись на flush.
    #[error("BTree contains cycles. Possible memory corruption.")]
    CorruptBTree,

    /// Запрошенная форма ключа не входит в закрытый набор.
    #[error("unsupported key shape '{0}'")]
    UnsupportedKeyShape(String),

    /// Операция над закрытым (или ещё не открытым) индексом.
    #[error("index is not open")]
    Closed,
}
