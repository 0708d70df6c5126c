pub fn round_size_up_to_alignment_u32(
    size: u32,
    required_alignment: u32,
) -> u32 {
    assert!(required_alignment > 0);
    ((size + required_alignment - 1) / required_alignment) * required_alignment
}

pub fn round_size_up_to_alignment_u64(
    size: u64,
    required_alignment: u64,
) -> u64 {
    assert!(required_alignment > 0);
    ((size + required_alignment - 1) / required_alignment) * required_alignment
}

pub fn any_as_bytes<T: Copy>(data: &T) -> &[u8] {
    let ptr: *const T = data;
    let ptr = ptr as *const u8;
    let slice: &[u8] = unsafe { std::slice::from_raw_parts(ptr, std::mem::size_of::<T>()) };

    slice
}

pub fn slice_as_bytes<T: Copy>(data: &[T]) -> &[u8] {
    let ptr = data.as_ptr() as *const u8;
    let slice: &[u8] = unsafe { std::slice::from_raw_parts(ptr, slice_size_in_bytes(data)) };

    slice
}

pub fn slice_size_in_bytes<T>(slice: &[T]) -> usize {
    let range = slice.as_ptr_range();
    (range.end as *const u8 as usize) - (range.start as *const u8 as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_up() {
        assert_eq!(round_size_up_to_alignment_u32(0, 16), 0);
        assert_eq!(round_size_up_to_alignment_u32(1, 16), 16);
        assert_eq!(round_size_up_to_alignment_u32(16, 16), 16);
        assert_eq!(round_size_up_to_alignment_u64(17, 16), 32);
    }

    #[test]
    fn slice_sizes() {
        let data = [0u32; 7];
        assert_eq!(slice_size_in_bytes(&data), 28);
        assert_eq!(slice_as_bytes(&data).len(), 28);
    }
}
