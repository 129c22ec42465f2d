use crate::gfx::UniformValue;

use super::reflect::UniformSlot;

/// Bytes reserved for one uniform slot, padded to a 16-byte multiple.
pub(crate) fn slot_size(slot: &UniformSlot) -> u32 {
    slot.size.next_multiple_of(16).max(16)
}

/// Lays out `value` with the WGSL uniform layout of `slot`.
///
/// The returned buffer is [`slot_size`] bytes long. Fails when the value
/// does not match the declared type.
pub(crate) fn pack(slot: &UniformSlot, value: UniformValue<'_>) -> Result<Vec<u8>, String> {
    let mut out = vec![0u8; slot_size(slot) as usize];

    match value {
        UniformValue::Mat4(m) => {
            if slot.array_stride.is_some() || slot.size != 64 {
                return Err(format!("{} is not a mat4x4<f32>", slot.name));
            }
            out[..64].copy_from_slice(bytemuck::cast_slice(m.as_slice()));
        }
        UniformValue::IVec2(v) => {
            if slot.array_stride.is_some() || slot.size != 8 {
                return Err(format!("{} is not a vec2<i32>", slot.name));
            }
            out[..8].copy_from_slice(bytemuck::cast_slice(v.as_slice()));
        }
        UniformValue::Vec2Array(values) => {
            let (Some(stride), Some(len)) = (slot.array_stride, slot.array_len) else {
                return Err(format!("{} is not a fixed-size array", slot.name));
            };
            if stride < 8 {
                return Err(format!("{} elements are smaller than a vec2", slot.name));
            }
            if values.len() > len as usize {
                return Err(format!(
                    "{} holds {len} elements, got {}",
                    slot.name,
                    values.len()
                ));
            }
            for (i, v) in values.iter().enumerate() {
                let at = i * stride as usize;
                out[at..at + 8].copy_from_slice(bytemuck::cast_slice(v.as_slice()));
            }
        }
    }

    Ok(out)
}
