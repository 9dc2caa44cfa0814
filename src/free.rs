//! Free-список смещений страниц.
//!
//! In-memory LIFO смещений страниц, опустевших с момента открытия. Аллокация
//! новой страницы сначала снимает смещение отсюда и только потом растит файл.
//! Список сознательно НЕ переживает закрытие: каталог на диске ссылается
//! только на живые страницы, а мёртвые дыры в файле недостижимы и безвредны
//! (простота протокола закрытия ценой места — до ближайшего clear()).

#[derive(Debug, Default)]
pub struct FreeOffsets {
    offsets: Vec<u32>,
}

impl FreeOffsets {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    #[inline]
    pub fn push(&mut self, offset: u32) {
        self.offsets.push(offset);
    }

    /// Последнее освобождённое смещение (LIFO).
    #[inline]
    pub fn pop(&mut self) -> Option<u32> {
        self.offsets.pop()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.offsets.clear();
    }
}
