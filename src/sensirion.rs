use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{I2c, SevenBitAddress};
use log::{debug, trace, warn};

const WORD_LEN: usize = 2;
const CHUNK_LEN: usize = WORD_LEN + 1;
const OPCODE_LEN: usize = 2;

// Serial number is the longest reply, set baseline the longest request.
const MAX_REPLY_WORDS: usize = 3;
const MAX_ARG_WORDS: usize = 2;

const CRC8_POLYNOMIAL: u8 = 0x31;
const CRC8_INIT: u8 = 0xff;

#[derive(Clone, Copy, Hash, Debug, PartialEq, Eq, PartialOrd, Ord, thiserror::Error)]
pub enum Error<I2cError> {
    #[error("I2C error: {0:?}")]
    I2c(I2cError),
    #[error("invalid CRC in reply word {index}")]
    InvalidCrc { index: usize },
    #[error("unsupported feature set {0:#06x}, sensor not detected")]
    UnsupportedFeatureSet(u16),
    #[error("invalid baseline: CO2eq and TVOC are both zero")]
    InvalidBaseline,
    #[error("{0:#04x} is not a 7-bit I2C address")]
    InvalidAddress(u8),
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Self::I2c(err)
    }
}

impl<E> embedded_hal::i2c::Error for Error<E>
where
    E: embedded_hal::i2c::Error,
{
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        match self {
            Self::I2c(err) => err.kind(),
            _ => embedded_hal::i2c::ErrorKind::Other,
        }
    }
}

/// A fixed sensor command: opcode, processing time and reply size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Command {
    pub name: &'static str,
    pub opcode: [u8; OPCODE_LEN],
    pub delay_ms: u32,
    pub reply_words: usize,
}

impl Command {
    pub const fn new(
        name: &'static str,
        opcode: [u8; OPCODE_LEN],
        delay_ms: u32,
        reply_words: usize,
    ) -> Self {
        Self {
            name,
            opcode,
            delay_ms,
            reply_words,
        }
    }
}

// https://sensirion.com/media/documents/984E0DD5/61644B8B/Sensirion_Gas_Sensors_Datasheet_SGP30.pdf
// Section 6.6
pub fn crc8(data: &[u8; WORD_LEN]) -> u8 {
    let mut crc = CRC8_INIT;

    for byte in data {
        crc ^= byte;

        for _ in 0..8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ CRC8_POLYNOMIAL;
            } else {
                crc <<= 1;
            }
        }
    }

    crc
}

/// Frames a word as it appears on the wire: high byte, low byte, CRC.
pub(crate) fn encode_word(word: u16) -> [u8; CHUNK_LEN] {
    let [hi, lo] = word.to_be_bytes();
    [hi, lo, crc8(&[hi, lo])]
}

/// Returns `None` if the CRC byte does not match.
pub(crate) fn decode_word(chunk: &[u8; CHUNK_LEN]) -> Option<u16> {
    let data = [chunk[0], chunk[1]];
    (crc8(&data) == chunk[2]).then(|| u16::from_be_bytes(data))
}

fn decode_words<E>(bytes: &[u8], words: &mut [u16]) -> Result<(), Error<E>> {
    debug_assert_eq!(bytes.len(), words.len() * CHUNK_LEN);

    for (index, (chunk, word)) in bytes
        .chunks_exact(CHUNK_LEN)
        .zip(words.iter_mut())
        .enumerate()
    {
        *word = decode_word(&[chunk[0], chunk[1], chunk[2]])
            .ok_or(Error::<E>::InvalidCrc { index })?;
    }

    Ok(())
}

/// Command/response framing over a single I2C device.
///
/// Every transaction holds the bus for its whole duration: write the command,
/// wait for the sensor to process it, then read the reply if one is expected.
#[derive(Debug)]
pub(crate) struct Sensor<I2C, D> {
    i2c: I2C,
    delay: D,
    address: SevenBitAddress,
}

impl<I2C: I2c, D: DelayNs> Sensor<I2C, D> {
    pub fn new(i2c: I2C, delay: D, address: SevenBitAddress) -> Self {
        Self {
            i2c,
            delay,
            address,
        }
    }

    pub fn address(&self) -> SevenBitAddress {
        self.address
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Sends a command that produces no reply.
    pub fn send(&mut self, command: &Command, args: &[u16]) -> Result<(), Error<I2C::Error>> {
        self.execute(command, args, &mut [])
    }

    /// Sends an argument-less command and reads back `N` verified words.
    pub fn read_words<const N: usize>(
        &mut self,
        command: &Command,
    ) -> Result<[u16; N], Error<I2C::Error>> {
        let mut words = [0u16; N];
        self.execute(command, &[], &mut words)?;
        Ok(words)
    }

    pub fn execute(
        &mut self,
        command: &Command,
        args: &[u16],
        reply: &mut [u16],
    ) -> Result<(), Error<I2C::Error>> {
        debug_assert!(args.len() <= MAX_ARG_WORDS);
        debug_assert!(reply.len() <= MAX_REPLY_WORDS);
        debug_assert_eq!(reply.len(), command.reply_words);

        let mut request = [0u8; OPCODE_LEN + MAX_ARG_WORDS * CHUNK_LEN];
        request[..OPCODE_LEN].copy_from_slice(&command.opcode);
        for (chunk, &arg) in request[OPCODE_LEN..]
            .chunks_exact_mut(CHUNK_LEN)
            .zip(args)
        {
            chunk.copy_from_slice(&encode_word(arg));
        }
        let request = &request[..OPCODE_LEN + args.len() * CHUNK_LEN];

        debug!(
            "{}: write {:02x?}, wait {} ms, read {} words",
            command.name,
            request,
            command.delay_ms,
            reply.len()
        );

        self.i2c.write(self.address, request)?;
        // The sensor does not answer before it is done processing.
        self.delay.delay_ms(command.delay_ms);

        if reply.is_empty() {
            return Ok(());
        }

        let mut buf = [0u8; MAX_REPLY_WORDS * CHUNK_LEN];
        let buf = &mut buf[..reply.len() * CHUNK_LEN];
        self.i2c.read(self.address, buf)?;
        trace!("{}: raw reply {:02x?}", command.name, buf);

        decode_words(buf, reply)
            .inspect_err(|err| warn!("{}: {}", command.name, err))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use embedded_hal::delay::DelayNs;

    /// Records every millisecond delay requested by the driver.
    #[derive(Debug, Default)]
    pub struct RecordingDelay {
        pub delays_ms: Vec<u32>,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, _ns: u32) {
            unimplemented!("the driver only waits in whole milliseconds")
        }

        fn delay_ms(&mut self, ms: u32) {
            self.delays_ms.push(ms);
        }
    }

    /// Frames words the way the sensor sends them.
    pub fn reply(words: &[u16]) -> Vec<u8> {
        words.iter().flat_map(|&w| super::encode_word(w)).collect()
    }
}
