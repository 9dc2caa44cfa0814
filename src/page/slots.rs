//! Слой слотов страницы: запись + упакованные связи дерева.
//!
//! Формат слота на диске (LE):
//! [key K::SIZE][offset i32][links u32]
//! links: parent(10) | left(10) | right(10) | color(1) | reserved(1).
//!
//! Слот 1 перегружает поля под служебные данные страницы: parent — число
//! живых ключей, right — голова free-списка, поле offset записи — индекс
//! корня дерева (на диске оно же несёт маркер целостности, см. mod.rs).

use byteorder::{ByteOrder, LittleEndian};

use crate::key::{FixedKey, KeyRecord};

/// Размер поля связей в байтах.
pub(crate) const LINKS_SIZE: usize = 4;

const INDEX_MASK: u32 = 0x3ff;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Slot<K: FixedKey> {
    pub rec: KeyRecord<K>,
    pub parent: u16,
    pub left: u16,
    pub right: u16,
    pub red: bool,
}

impl<K: FixedKey> Default for Slot<K> {
    fn default() -> Self {
        Self {
            rec: KeyRecord::default(),
            parent: 0,
            left: 0,
            right: 0,
            red: false,
        }
    }
}

impl<K: FixedKey> Slot<K> {
    /// Размер слота на диске.
    pub(crate) const DISK_SIZE: usize = KeyRecord::<K>::DISK_SIZE + LINKS_SIZE;

    pub(crate) fn encode(&self, buf: &mut [u8]) {
        self.rec.write_to(&mut buf[..KeyRecord::<K>::DISK_SIZE]);
        let links = (self.parent as u32 & INDEX_MASK)
            | ((self.left as u32 & INDEX_MASK) << 10)
            | ((self.right as u32 & INDEX_MASK) << 20)
            | ((self.red as u32) << 30);
        LittleEndian::write_u32(
            &mut buf[KeyRecord::<K>::DISK_SIZE..KeyRecord::<K>::DISK_SIZE + LINKS_SIZE],
            links,
        );
    }

    pub(crate) fn decode(buf: &[u8]) -> Self {
        let rec = KeyRecord::<K>::read_from(&buf[..KeyRecord::<K>::DISK_SIZE]);
        let links = LittleEndian::read_u32(
            &buf[KeyRecord::<K>::DISK_SIZE..KeyRecord::<K>::DISK_SIZE + LINKS_SIZE],
        );
        Self {
            rec,
            parent: (links & INDEX_MASK) as u16,
            left: ((links >> 10) & INDEX_MASK) as u16,
            right: ((links >> 20) & INDEX_MASK) as u16,
            red: (links >> 30) & 1 == 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_links_roundtrip() {
        let mut s = Slot::<i64>::default();
        s.rec = KeyRecord::new(-5i64, 123);
        s.parent = 1023;
        s.left = 7;
        s.right = 512;
        s.red = true;

        let mut buf = vec![0u8; Slot::<i64>::DISK_SIZE];
        s.encode(&mut buf);
        let d = Slot::<i64>::decode(&buf);
        assert_eq!(d.rec, s.rec);
        assert_eq!(d.parent, 1023);
        assert_eq!(d.left, 7);
        assert_eq!(d.right, 512);
        assert!(d.red);
    }
}
