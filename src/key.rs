//! Модель ключей.
//!
//! Закрытый набор форм ключа (скаляр, пара, тройка) из примитивов i32 / i64 /
//! timestamp (тики i64) / f64. Форма выбирается один раз при создании дерева:
//! компаратор и размер "запечены" в тип через трейт `FixedKey`, дальнейшие
//! операции обобщены по нему — никакой диспетчеризации на каждое сравнение.
//!
//! `KeyShape` — рантайм-тег того же набора для инструментов (CLI), и
//! единственное место, откуда происходит `UnsupportedKeyShape`.
//!
//! Формат на диске: компоненты ключа подряд, little-endian, без паддинга.

use byteorder::{ByteOrder, LittleEndian};

use crate::errors::IndexError;

mod sealed {
    pub trait Sealed {}
}

/// Ключ фиксированного размера с тотальным порядком и явной LE-кодировкой.
///
/// Набор реализаций закрыт (sealed): он в точности повторяет формы,
/// которые понимает формат файла.
pub trait FixedKey: Copy + Ord + Default + std::fmt::Debug + sealed::Sealed + 'static {
    /// Размер ключа на диске в байтах.
    const SIZE: usize;
    /// Рантайм-тег формы.
    const SHAPE: KeyShape;

    fn write_to(&self, buf: &mut [u8]);
    fn read_from(buf: &[u8]) -> Self;
}

// ---- примитивы-обёртки ----

/// Временная метка: счётчик тиков i64. Сравнивается как целое.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

/// f64 с тотальным порядком (`total_cmp`), пригодный как ключ.
#[derive(Debug, Clone, Copy, Default)]
pub struct F64(pub f64);

impl PartialEq for F64 {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == std::cmp::Ordering::Equal
    }
}
impl Eq for F64 {}
impl PartialOrd for F64 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for F64 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

// ---- рантайм-тег формы ----

/// Закрытый набор форм ключа.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyShape {
    I32,
    I64,
    Timestamp64,
    F64,
    I32I32,
    I32I64,
    I32Timestamp,
    I64I32,
    I64I64,
    I32I32I32,
    I32I32Timestamp,
    I32TimestampI32,
}

impl KeyShape {
    pub const ALL: [KeyShape; 12] = [
        KeyShape::I32,
        KeyShape::I64,
        KeyShape::Timestamp64,
        KeyShape::F64,
        KeyShape::I32I32,
        KeyShape::I32I64,
        KeyShape::I32Timestamp,
        KeyShape::I64I32,
        KeyShape::I64I64,
        KeyShape::I32I32I32,
        KeyShape::I32I32Timestamp,
        KeyShape::I32TimestampI32,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            KeyShape::I32 => "i32",
            KeyShape::I64 => "i64",
            KeyShape::Timestamp64 => "timestamp",
            KeyShape::F64 => "f64",
            KeyShape::I32I32 => "i32,i32",
            KeyShape::I32I64 => "i32,i64",
            KeyShape::I32Timestamp => "i32,timestamp",
            KeyShape::I64I32 => "i64,i32",
            KeyShape::I64I64 => "i64,i64",
            KeyShape::I32I32I32 => "i32,i32,i32",
            KeyShape::I32I32Timestamp => "i32,i32,timestamp",
            KeyShape::I32TimestampI32 => "i32,timestamp,i32",
        }
    }

    /// Размер ключа этой формы на диске.
    pub fn key_size(&self) -> usize {
        match self {
            KeyShape::I32 => 4,
            KeyShape::I64 | KeyShape::Timestamp64 | KeyShape::F64 | KeyShape::I32I32 => 8,
            KeyShape::I32I64
            | KeyShape::I32Timestamp
            | KeyShape::I64I32
            | KeyShape::I32I32I32 => 12,
            KeyShape::I64I64 | KeyShape::I32I32Timestamp | KeyShape::I32TimestampI32 => 16,
        }
    }

    /// Разбор имени формы; неизвестное имя — `UnsupportedKeyShape`.
    pub fn parse(name: &str) -> Result<KeyShape, IndexError> {
        let norm: String = name
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        for shape in KeyShape::ALL {
            if shape.name() == norm {
                return Ok(shape);
            }
        }
        Err(IndexError::UnsupportedKeyShape(name.to_string()))
    }
}

impl std::fmt::Display for KeyShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---- запись дерева: (ключ, offset) ----

/// Единица хранения: ключ плюс 32-битный указатель записи приложения.
/// Порядок — лексикографический (key, offset); offset движком не
/// разыменовывается.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct KeyRecord<K: FixedKey> {
    pub key: K,
    pub offset: i32,
}

impl<K: FixedKey> KeyRecord<K> {
    /// Размер записи на диске: ключ + offset i32.
    pub const DISK_SIZE: usize = K::SIZE + 4;

    pub fn new(key: K, offset: i32) -> Self {
        Self { key, offset }
    }

    pub fn write_to(&self, buf: &mut [u8]) {
        self.key.write_to(&mut buf[..K::SIZE]);
        LittleEndian::write_i32(&mut buf[K::SIZE..K::SIZE + 4], self.offset);
    }

    pub fn read_from(buf: &[u8]) -> Self {
        Self {
            key: K::read_from(&buf[..K::SIZE]),
            offset: LittleEndian::read_i32(&buf[K::SIZE..K::SIZE + 4]),
        }
    }
}

// ---- реализации форм ----

impl sealed::Sealed for i32 {}
impl FixedKey for i32 {
    const SIZE: usize = 4;
    const SHAPE: KeyShape = KeyShape::I32;

    fn write_to(&self, buf: &mut [u8]) {
        LittleEndian::write_i32(buf, *self);
    }
    fn read_from(buf: &[u8]) -> Self {
        LittleEndian::read_i32(buf)
    }
}

impl sealed::Sealed for i64 {}
impl FixedKey for i64 {
    const SIZE: usize = 8;
    const SHAPE: KeyShape = KeyShape::I64;

    fn write_to(&self, buf: &mut [u8]) {
        LittleEndian::write_i64(buf, *self);
    }
    fn read_from(buf: &[u8]) -> Self {
        LittleEndian::read_i64(buf)
    }
}

impl sealed::Sealed for Timestamp {}
impl FixedKey for Timestamp {
    const SIZE: usize = 8;
    const SHAPE: KeyShape = KeyShape::Timestamp64;

    fn write_to(&self, buf: &mut [u8]) {
        LittleEndian::write_i64(buf, self.0);
    }
    fn read_from(buf: &[u8]) -> Self {
        Timestamp(LittleEndian::read_i64(buf))
    }
}

impl sealed::Sealed for F64 {}
impl FixedKey for F64 {
    const SIZE: usize = 8;
    const SHAPE: KeyShape = KeyShape::F64;

    fn write_to(&self, buf: &mut [u8]) {
        LittleEndian::write_f64(buf, self.0);
    }
    fn read_from(buf: &[u8]) -> Self {
        F64(LittleEndian::read_f64(buf))
    }
}

// Составные формы: компоненты подряд, без паддинга. Порядок кортежей в Rust
// лексикографический — совпадает с требуемым.

macro_rules! pair_key {
    ($a:ty, $b:ty, $shape:expr, $size:expr) => {
        impl sealed::Sealed for ($a, $b) {}
        impl FixedKey for ($a, $b) {
            const SIZE: usize = $size;
            const SHAPE: KeyShape = $shape;

            fn write_to(&self, buf: &mut [u8]) {
                self.0.write_to(&mut buf[..<$a>::SIZE]);
                self.1.write_to(&mut buf[<$a>::SIZE..<$a>::SIZE + <$b>::SIZE]);
            }
            fn read_from(buf: &[u8]) -> Self {
                (
                    <$a>::read_from(&buf[..<$a>::SIZE]),
                    <$b>::read_from(&buf[<$a>::SIZE..<$a>::SIZE + <$b>::SIZE]),
                )
            }
        }
    };
}

macro_rules! triple_key {
    ($a:ty, $b:ty, $c:ty, $shape:expr, $size:expr) => {
        impl sealed::Sealed for ($a, $b, $c) {}
        impl FixedKey for ($a, $b, $c) {
            const SIZE: usize = $size;
            const SHAPE: KeyShape = $shape;

            fn write_to(&self, buf: &mut [u8]) {
                self.0.write_to(&mut buf[..<$a>::SIZE]);
                self.1.write_to(&mut buf[<$a>::SIZE..<$a>::SIZE + <$b>::SIZE]);
                self.2.write_to(
                    &mut buf[<$a>::SIZE + <$b>::SIZE..<$a>::SIZE + <$b>::SIZE + <$c>::SIZE],
                );
            }
            fn read_from(buf: &[u8]) -> Self {
                (
                    <$a>::read_from(&buf[..<$a>::SIZE]),
                    <$b>::read_from(&buf[<$a>::SIZE..<$a>::SIZE + <$b>::SIZE]),
                    <$c>::read_from(
                        &buf[<$a>::SIZE + <$b>::SIZE..<$a>::SIZE + <$b>::SIZE + <$c>::SIZE],
                    ),
                )
            }
        }
    };
}

pair_key!(i32, i32, KeyShape::I32I32, 8);
pair_key!(i32, i64, KeyShape::I32I64, 12);
pair_key!(i32, Timestamp, KeyShape::I32Timestamp, 12);
pair_key!(i64, i32, KeyShape::I64I32, 12);
pair_key!(i64, i64, KeyShape::I64I64, 16);
triple_key!(i32, i32, i32, KeyShape::I32I32I32, 12);
triple_key!(i32, i32, Timestamp, KeyShape::I32I32Timestamp, 16);
triple_key!(i32, Timestamp, i32, KeyShape::I32TimestampI32, 16);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_record_order_is_key_then_offset() {
        let a = KeyRecord::new(5i32, 10);
        let b = KeyRecord::new(5i32, 11);
        let c = KeyRecord::new(6i32, 0);
        assert!(a < b);
        assert!(b < c);
        assert_eq!(a, KeyRecord::new(5i32, 10));
    }

    #[test]
    fn compound_order_is_lexicographic() {
        let a = KeyRecord::new((1i32, 100i32), 0);
        let b = KeyRecord::new((1i32, 101i32), 0);
        let c = KeyRecord::new((2i32, 0i32), 0);
        assert!(a < b && b < c);

        let t1 = (7i32, Timestamp(1000), 3i32);
        let t2 = (7i32, Timestamp(1000), 4i32);
        let t3 = (7i32, Timestamp(1001), 0i32);
        assert!(t1 < t2 && t2 < t3);
    }

    #[test]
    fn f64_total_order() {
        assert!(F64(-1.5) < F64(0.0));
        assert!(F64(0.0) < F64(1.5));
        assert!(F64(f64::NEG_INFINITY) < F64(-1.0e300));
        // -0.0 < +0.0 в тотальном порядке
        assert!(F64(-0.0) < F64(0.0));
    }

    #[test]
    fn roundtrip_all_shapes_sizes() {
        fn rt<K: FixedKey>(k: K) {
            let mut buf = vec![0u8; KeyRecord::<K>::DISK_SIZE];
            let rec = KeyRecord::new(k, 77);
            rec.write_to(&mut buf);
            assert_eq!(KeyRecord::<K>::read_from(&buf), rec);
            assert_eq!(K::SIZE, K::SHAPE.key_size());
        }
        rt(-42i32);
        rt(1i64 << 40);
        rt(Timestamp(633_000_000_000_000_000));
        rt(F64(3.25));
        rt((1i32, -2i32));
        rt((1i32, 2i64));
        rt((1i32, Timestamp(5)));
        rt((9i64, 8i32));
        rt((9i64, 8i64));
        rt((1i32, 2i32, 3i32));
        rt((1i32, 2i32, Timestamp(3)));
        rt((1i32, Timestamp(2), 3i32));
    }

    #[test]
    fn shape_parse_known_and_unknown() {
        assert_eq!(KeyShape::parse("i32").unwrap(), KeyShape::I32);
        assert_eq!(
            KeyShape::parse("i32, timestamp, i32").unwrap(),
            KeyShape::I32TimestampI32
        );
        let err = KeyShape::parse("uuid").unwrap_err();
        assert!(matches!(err, IndexError::UnsupportedKeyShape(_)));
    }
}
