use object_pool::{Pool, Reusable};
use rustfft::num_complex::Complex;
use rustfft::num_traits::Zero;

use crate::float::{lit, Float};

pub fn new_real_buffer<T: Float>(size: usize) -> Vec<T> {
    vec![T::zero(); size]
}

pub fn new_complex_buffer<T: Float>(size: usize) -> Vec<Complex<T>> {
    vec![Complex::zero(); size]
}

/// Copy `input` into the real part of `output` and zero everything else,
/// including the tail of `output` past `input.len()`.
pub fn copy_real_to_complex<T: Float>(input: &[T], output: &mut [Complex<T>]) {
    assert!(input.len() <= output.len());
    input.iter().zip(output.iter_mut()).for_each(|(i, o)| {
        o.re = *i;
        o.im = T::zero();
    });
    output[input.len()..]
        .iter_mut()
        .for_each(|o| *o = Complex::zero())
}

/// Copy the real part of the first `output.len()` values of `input`, multiplied by `scale`.
pub fn copy_complex_to_real<T: Float>(input: &[Complex<T>], output: &mut [T], scale: T) {
    assert!(output.len() <= input.len());
    output
        .iter_mut()
        .zip(input.iter())
        .for_each(|(o, c)| *o = c.re * scale);
}

/// Computes |x|^2 for each complex value x in `arr`. This function
/// modifies `arr` in place and leaves the complex component zero.
pub fn modulus_squared<T: Float>(arr: &mut [Complex<T>]) {
    for s in arr {
        s.re = s.re * s.re + s.im * s.im;
        s.im = T::zero();
    }
}

/// Compute the sum of the square of each element of `arr`.
pub fn square_sum<T: Float>(arr: &[T]) -> T {
    arr.iter().map(|&s| s * s).sum::<T>()
}

/// Write the running sum of squares of `arr` to `result`, so that
/// `result[k]` is the energy of `arr[..k]`. `result` needs one more slot than `arr`.
pub fn square_prefix_sum<T: Float>(arr: &[T], result: &mut [T]) {
    assert!(result.len() > arr.len());
    result[0] = T::zero();
    for (j, &s) in arr.iter().enumerate() {
        result[j + 1] = result[j] + s * s;
    }
}

/// Root-mean-square energy of `arr`; zero for an empty slice.
pub fn rms<T: Float>(arr: &[T]) -> T {
    if arr.is_empty() {
        return T::zero();
    }
    (square_sum(arr) / lit(arr.len() as f64)).sqrt()
}

/// A pool of real/complex buffer objects. Buffers are dynamically created as needed
/// and reused if previously `Drop`ed. Buffers are never freed. Instead buffers are kept
/// in reserve and reused when a new buffer is requested.
///
/// The pool locks internally, so a single pool can hand out buffers to
/// several threads at once.
///
/// ```rust
/// use mcleod_pitch::utils::buffer::BufferPool;
///
/// let buffers = BufferPool::new(3);
/// let mut buf1 = buffers.get_real_buffer();
/// buf1[0] = 5.5;
/// {
///     let mut buf2 = buffers.get_real_buffer();
///     buf2[1] = 6.6;
/// }
/// // `buf2` went back to the pool and is handed out again.
/// let buf3 = buffers.get_real_buffer();
/// assert_eq!(&buf3[..], &[0.0, 6.6, 0.0]);
/// ```
pub struct BufferPool<T> {
    real_buffers: Pool<Vec<T>>,
    complex_buffers: Pool<Vec<Complex<T>>>,
    pub buffer_size: usize,
}

impl<T: Float> BufferPool<T> {
    pub fn new(buffer_size: usize) -> Self {
        BufferPool {
            real_buffers: Pool::new(0, || new_real_buffer(buffer_size)),
            complex_buffers: Pool::new(0, || new_complex_buffer(buffer_size)),
            buffer_size,
        }
    }
    /// Get a reference to a buffer that can be used until it is `Drop`ed.
    pub fn get_real_buffer(&self) -> Reusable<'_, Vec<T>> {
        self.real_buffers.pull(|| new_real_buffer(self.buffer_size))
    }
    /// Get a reference to a buffer that can be used until it is `Drop`ed.
    pub fn get_complex_buffer(&self) -> Reusable<'_, Vec<Complex<T>>> {
        self.complex_buffers
            .pull(|| new_complex_buffer(self.buffer_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_are_reused() {
        let buffers = BufferPool::new(3);
        let mut buf1 = buffers.get_real_buffer();
        buf1[0] = 5.5;
        {
            let mut buf2 = buffers.get_real_buffer();
            buf2[1] = 6.6;
        }
        {
            let mut buf3 = buffers.get_real_buffer();
            buf3[2] = 7.7;
        }
        drop(buf1);

        let buf1 = &buffers.get_real_buffer();
        let buf2 = &buffers.get_real_buffer();
        // Buffers are distributed in LIFO order, so compare them "backwards".
        assert_eq!(&buf2[..], &[0.0, 6.6, 7.7]);
        assert_eq!(&buf1[..], &[5.5, 0., 0.]);
    }

    #[test]
    fn real_to_complex_zero_pads() {
        let mut out = vec![Complex::new(9.0, 9.0); 4];
        copy_real_to_complex(&[1.0, 2.0], &mut out);
        assert_eq!(
            out,
            vec![
                Complex::new(1.0, 0.0),
                Complex::new(2.0, 0.0),
                Complex::zero(),
                Complex::zero()
            ]
        );
    }

    #[test]
    fn prefix_sum_of_squares() {
        let mut result = vec![0.0; 4];
        square_prefix_sum(&[1.0, -2.0, 3.0], &mut result);
        assert_eq!(result, vec![0.0, 1.0, 5.0, 14.0]);
    }

    #[test]
    fn rms_of_constant_and_empty() {
        assert_eq!(rms(&[0.5f64; 8]), 0.5);
        assert_eq!(rms::<f32>(&[]), 0.0);
    }
}
