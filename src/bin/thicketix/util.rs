//! Разбор ключей из аргументов CLI + диспетчеризация по форме.

use anyhow::{anyhow, Result};

use ThicketIx::{FixedKey, Timestamp, F64};

/// Разбор значения ключа из строки CLI. Компоненты составных ключей
/// разделяются запятыми; timestamp задаётся числом тиков.
pub trait ParseKey: FixedKey {
    fn parse_cli(s: &str) -> Result<Self>;
}

fn bad(s: &str) -> anyhow::Error {
    anyhow!("cannot parse key value '{}'", s)
}

impl ParseKey for i32 {
    fn parse_cli(s: &str) -> Result<Self> {
        s.trim().parse().map_err(|_| bad(s))
    }
}

impl ParseKey for i64 {
    fn parse_cli(s: &str) -> Result<Self> {
        s.trim().parse().map_err(|_| bad(s))
    }
}

impl ParseKey for Timestamp {
    fn parse_cli(s: &str) -> Result<Self> {
        Ok(Timestamp(s.trim().parse().map_err(|_| bad(s))?))
    }
}

impl ParseKey for F64 {
    fn parse_cli(s: &str) -> Result<Self> {
        Ok(F64(s.trim().parse().map_err(|_| bad(s))?))
    }
}

fn split_n(s: &str, n: usize) -> Result<Vec<&str>> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != n {
        return Err(anyhow!(
            "key '{}' has {} component(s), expected {}",
            s,
            parts.len(),
            n
        ));
    }
    Ok(parts)
}

macro_rules! parse_pair {
    ($a:ty, $b:ty) => {
        impl ParseKey for ($a, $b) {
            fn parse_cli(s: &str) -> Result<Self> {
                let p = split_n(s, 2)?;
                Ok((<$a>::parse_cli(p[0])?, <$b>::parse_cli(p[1])?))
            }
        }
    };
}

macro_rules! parse_triple {
    ($a:ty, $b:ty, $c:ty) => {
        impl ParseKey for ($a, $b, $c) {
            fn parse_cli(s: &str) -> Result<Self> {
                let p = split_n(s, 3)?;
                Ok((
                    <$a>::parse_cli(p[0])?,
                    <$b>::parse_cli(p[1])?,
                    <$c>::parse_cli(p[2])?,
                ))
            }
        }
    };
}

parse_pair!(i32, i32);
parse_pair!(i32, i64);
parse_pair!(i32, Timestamp);
parse_pair!(i64, i32);
parse_pair!(i64, i64);
parse_triple!(i32, i32, i32);
parse_triple!(i32, i32, Timestamp);
parse_triple!(i32, Timestamp, i32);

/// Выполнить блок кода с конкретным типом ключа, выбранным по форме.
#[macro_export]
macro_rules! with_key_shape {
    ($shape:expr, $K:ident, $body:block) => {{
        use ThicketIx::{KeyShape, Timestamp, F64};
        match $shape {
            KeyShape::I32 => {
                type $K = i32;
                $body
            }
            KeyShape::I64 => {
                type $K = i64;
                $body
            }
            KeyShape::Timestamp64 => {
                type $K = Timestamp;
                $body
            }
            KeyShape::F64 => {
                type $K = F64;
                $body
            }
            KeyShape::I32I32 => {
                type $K = (i32, i32);
                $body
            }
            KeyShape::I32I64 => {
                type $K = (i32, i64);
                $body
            }
            KeyShape::I32Timestamp => {
                type $K = (i32, Timestamp);
                $body
            }
            KeyShape::I64I32 => {
                type $K = (i64, i32);
                $body
            }
            KeyShape::I64I64 => {
                type $K = (i64, i64);
                $body
            }
            KeyShape::I32I32I32 => {
                type $K = (i32, i32, i32);
                $body
            }
            KeyShape::I32I32Timestamp => {
                type $K = (i32, i32, Timestamp);
                $body
            }
            KeyShape::I32TimestampI32 => {
                type $K = (i32, Timestamp, i32);
                $body
            }
        }
    }};
}
